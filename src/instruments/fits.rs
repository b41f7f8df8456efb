//! Descriptors every FITS file has.
use super::{Accessor, DescriptorResult};
use crate::astrodata::AstroData;

pub(super) static KEYWORDS: &[(&str, &str)] = &[
    ("instrument", "INSTRUME"),
    ("object", "OBJECT"),
    ("telescope", "TELESCOP"),
    ("ut_date", "DATE-OBS"),
];

pub(super) static DESCRIPTORS: &[(&str, Accessor)] = &[
    ("instrument", instrument),
    ("object", object),
    ("telescope", telescope),
];

fn instrument(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value(ad.keyword_for("instrument")?))
}

fn object(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value(ad.keyword_for("object")?))
}

fn telescope(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value(ad.keyword_for("telescope")?))
}
