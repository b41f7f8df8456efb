//! Instrument classes and their descriptor registries.
//!
//! Each class has a table of descriptors, a table mapping generic names to
//! header keywords, and a list of tag rules. Lookups start at the class of a
//! file and walk up through its parents, so an instrument only lists what
//! it does differently from generic Gemini data.
mod common;
mod f2;
mod fits;
mod gemini;
mod gmos;
mod gnirs;
mod wcs;

pub use common::{
    convert_units, parse_date, parse_datetime, parse_percentile, parse_time, remove_component_id,
    section_to_tuple, Unit,
};
pub use wcs::Wcs;

use crate::{
    astrodata::{resolve, AstroData, DescriptorError, DescriptorValue, TagSet},
    types::Header,
};
use std::collections::BTreeSet;

/// The outcome of evaluating a descriptor
pub type DescriptorResult = Result<DescriptorValue, DescriptorError>;

/// Evaluates one descriptor.
pub type Accessor = fn(&AstroData) -> DescriptorResult;

/// A tag rule; `None` when the rule does not apply.
pub type TagRule = fn(&AstroData) -> Option<TagSet>;

/// The kinds of data that descriptors can be evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentClass {
    /// Any FITS file
    Fits,
    /// Data from a Gemini telescope
    Gemini,
    /// The Gemini Multi-Object Spectrographs
    Gmos,
    /// FLAMINGOS-2
    F2,
    /// The Gemini Near-Infrared Spectrograph
    Gnirs,
}

impl InstrumentClass {
    /// The most specific class that matches a primary header.
    pub fn classify(phu: &Header<'_>) -> InstrumentClass {
        let upper = |name: &str| {
            phu.get(name)
                .and_then(|v| v.as_str())
                .map(str::to_uppercase)
                .unwrap_or_default()
        };
        let instrument = upper("INSTRUME");
        match instrument.as_str() {
            "GMOS-N" | "GMOS-S" => InstrumentClass::Gmos,
            "F2" | "FLAM" => InstrumentClass::F2,
            "GNIRS" => InstrumentClass::Gnirs,
            _ => match upper("OBSERVAT").as_str() {
                "GEMINI-NORTH" | "GEMINI-SOUTH" => InstrumentClass::Gemini,
                _ => InstrumentClass::Fits,
            },
        }
    }

    /// The name used in messages
    pub fn name(self) -> &'static str {
        match self {
            InstrumentClass::Fits => "FITS",
            InstrumentClass::Gemini => "Gemini",
            InstrumentClass::Gmos => "GMOS",
            InstrumentClass::F2 => "F2",
            InstrumentClass::Gnirs => "GNIRS",
        }
    }

    /// The class this one falls back to
    pub fn parent(self) -> Option<InstrumentClass> {
        match self {
            InstrumentClass::Fits => None,
            InstrumentClass::Gemini => Some(InstrumentClass::Fits),
            InstrumentClass::Gmos | InstrumentClass::F2 | InstrumentClass::Gnirs => {
                Some(InstrumentClass::Gemini)
            }
        }
    }

    /// This class followed by its ancestors
    pub fn lineage(self) -> impl Iterator<Item = InstrumentClass> {
        std::iter::successors(Some(self), |class| class.parent())
    }

    fn descriptor_table(self) -> &'static [(&'static str, Accessor)] {
        match self {
            InstrumentClass::Fits => fits::DESCRIPTORS,
            InstrumentClass::Gemini => gemini::DESCRIPTORS,
            InstrumentClass::Gmos => gmos::DESCRIPTORS,
            InstrumentClass::F2 => f2::DESCRIPTORS,
            InstrumentClass::Gnirs => gnirs::DESCRIPTORS,
        }
    }

    fn keyword_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            InstrumentClass::Fits => fits::KEYWORDS,
            InstrumentClass::Gemini => gemini::KEYWORDS,
            InstrumentClass::Gmos => gmos::KEYWORDS,
            InstrumentClass::F2 => f2::KEYWORDS,
            InstrumentClass::Gnirs => gnirs::KEYWORDS,
        }
    }

    fn tag_rules(self) -> &'static [(&'static str, TagRule)] {
        match self {
            InstrumentClass::Fits => &[],
            InstrumentClass::Gemini => gemini::TAG_RULES,
            InstrumentClass::Gmos => gmos::TAG_RULES,
            InstrumentClass::F2 => f2::TAG_RULES,
            InstrumentClass::Gnirs => gnirs::TAG_RULES,
        }
    }

    /// The accessor for descriptor `name`, from the nearest class that has one.
    pub fn accessor(self, name: &str) -> Option<Accessor> {
        self.lineage().find_map(|class| {
            class
                .descriptor_table()
                .iter()
                .find(|(descriptor, _)| *descriptor == name)
                .map(|(_, accessor)| *accessor)
        })
    }

    /// The header keyword for the generic `name`, from the nearest class
    /// that maps it.
    pub fn keyword_for(self, name: &str) -> Option<&'static str> {
        self.lineage().find_map(|class| {
            class
                .keyword_table()
                .iter()
                .find(|(generic, _)| *generic == name)
                .map(|(_, keyword)| *keyword)
        })
    }

    /// Evaluate the tag rules of this class and its ancestors for `ad`.
    ///
    /// Rules are taken in name order; a rule in a class hides a rule with the
    /// same name in an ancestor.
    pub fn tags(self, ad: &AstroData) -> BTreeSet<&'static str> {
        let mut rules: Vec<(&'static str, TagRule)> = Vec::new();
        for class in self.lineage() {
            for (name, rule) in class.tag_rules() {
                if !rules.iter().any(|(seen, _)| seen == name) {
                    rules.push((*name, *rule));
                }
            }
        }
        rules.sort_by_key(|(name, _)| *name);
        resolve(rules.into_iter().filter_map(|(_, rule)| rule(ad)).collect())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{
        astrodata::AstroData,
        types::{Header, HeaderRecord, Keyword, KeywordRecord, Value},
    };
    use std::str::FromStr;

    /// A header value for tests
    #[derive(Clone)]
    pub enum V {
        S(&'static str),
        I(i64),
        F(f64),
        B(bool),
        U,
    }

    pub fn header(cards: &[(&str, V)]) -> Header<'static> {
        Header::from_records(
            cards
                .iter()
                .map(|(name, value)| {
                    let value = match value {
                        V::S(s) => Value::CharacterString((*s).into()),
                        V::I(n) => Value::Integer(*n),
                        V::F(f) => Value::Real(*f),
                        V::B(b) => Value::Logical(*b),
                        V::U => Value::Undefined,
                    };
                    HeaderRecord::KeywordRecord(KeywordRecord::new(
                        Keyword::from_str(name).unwrap(),
                        value,
                        None,
                    ))
                })
                .collect(),
        )
    }

    pub fn ad(phu: &[(&str, V)], extensions: &[&[(&str, V)]]) -> AstroData {
        AstroData::from_headers(
            "N20170101S0001.fits",
            header(phu),
            extensions.iter().map(|cards| header(cards)).collect(),
        )
    }

    /// The rendered value of a descriptor
    pub fn show(ad: &AstroData, descriptor: &str) -> String {
        ad.descriptor(descriptor).unwrap().to_string()
    }
}
