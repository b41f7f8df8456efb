//! FLAMINGOS-2, the near-infrared imager and spectrograph at Gemini South.
use super::{
    convert_units,
    gemini::{inport_is_one, offset_in_pixels, wcs_coordinates_at, wcs_pixel_scale},
    Accessor, DescriptorResult, TagRule, Unit,
};
use crate::{
    astrodata::{AstroData, DescriptorError, DescriptorValue, Section, TagSet},
    types::Value,
};
use regex::Regex;
use std::sync::LazyLock;

pub(super) static KEYWORDS: &[(&str, &str)] = &[
    ("camera", "LYOT"),
    ("central_wavelength", "GRWLEN"),
    ("disperser", "GRISM"),
    ("focal_plane_mask", "MOSPOS"),
    ("lyot_stop", "LYOT"),
];

pub(super) static DESCRIPTORS: &[(&str, Accessor)] = &[
    ("array_section", array_section),
    ("central_wavelength", central_wavelength),
    ("data_section", array_section),
    ("detector_section", array_section),
    ("detector_x_offset", detector_x_offset),
    ("detector_y_offset", detector_y_offset),
    ("dispersion_axis", dispersion_axis),
    ("filter_name", filter_name),
    ("pixel_scale", pixel_scale),
    ("read_mode", read_mode),
    ("telescope_x_offset", telescope_x_offset),
    ("telescope_y_offset", telescope_y_offset),
    ("wcs_dec", wcs_dec),
    ("wcs_ra", wcs_ra),
];

pub(super) static TAG_RULES: &[(&str, TagRule)] = &[
    ("arc", tag_arc),
    ("dark", tag_dark),
    ("disperser", tag_disperser),
    ("flat", tag_flat),
    ("image", tag_image),
    ("instrument", tag_instrument),
    ("long_slit", tag_long_slit),
    ("multi_object", tag_multi_object),
    ("twilight", tag_twilight),
];

// MOSPOS of a long slit, e.g. "2pix-slit"
static PIXEL_SLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.?pix-slit").expect("Failed to compile slit position regex"));

// The whole 2048x2048 array is always read out.
const FULL_FRAME: Section = Section {
    x1: 0,
    x2: 2048,
    y1: 0,
    y2: 2048,
};

// Where the Cassegrain rotator axis falls on the detector.
const ROTATOR_CENTRE: (f64, f64) = (1034.0, 1054.0);

fn negated(value: &Value<'_>) -> DescriptorValue {
    match value {
        Value::Integer(n) => DescriptorValue::Int(-n),
        Value::Real(f) => DescriptorValue::Float(-f),
        other => other.into(),
    }
}

fn array_section(ad: &AstroData) -> DescriptorResult {
    Ok(vec![FULL_FRAME; ad.hdr_headers().len()].into())
}

fn central_wavelength(ad: &AstroData) -> DescriptorResult {
    let keyword = ad.keyword_for("central_wavelength")?;
    let value = ad
        .phu_get(keyword)
        .ok_or_else(|| DescriptorError::missing("central_wavelength", keyword))?;
    let mut microns = value
        .as_f64()
        .or_else(|| value.as_str()?.trim().parse().ok())
        .ok_or_else(|| {
            DescriptorError::evaluation("central_wavelength", format!("{} is not a number", value))
        })?;
    if ad.phu_str("FILTER1") == Some("K-long-G0812") {
        microns = 2.2;
    }
    if microns < 0.0 {
        return Ok(DescriptorValue::None);
    }
    Ok(convert_units(Unit::Micrometers, microns, Unit::Meters).into())
}

fn detector_x_offset(ad: &AstroData) -> DescriptorResult {
    Ok(offset_in_pixels(ad, "QOFFSET")?.map(|q| -q).into())
}

fn detector_y_offset(ad: &AstroData) -> DescriptorResult {
    let offset = offset_in_pixels(ad, "POFFSET")?.map(|p| -p);
    // bottom port
    let flip = if inport_is_one(ad) { -1.0 } else { 1.0 };
    Ok(offset.map(|y| flip * y).into())
}

fn dispersion_axis(ad: &AstroData) -> DescriptorResult {
    let axis = if ad.has_tag("SPECT") {
        DescriptorValue::Int(2)
    } else {
        DescriptorValue::None
    };
    Ok(DescriptorValue::List(vec![axis; ad.hdr_headers().len()]))
}

fn filter_name(ad: &AstroData) -> DescriptorResult {
    // FILT1POS and FILT2POS were used before March 2010
    let filters = ad
        .phu_str("FILTER1")
        .zip(ad.phu_str("FILTER2"))
        .or_else(|| ad.phu_str("FILT1POS").zip(ad.phu_str("FILT2POS")));
    Ok(filters.map(|(f1, f2)| format!("{}&{}", f1, f2)).into())
}

fn pixel_scale(ad: &AstroData) -> DescriptorResult {
    match wcs_pixel_scale(ad) {
        Some(scale) => Ok(scale.into()),
        None => Ok(ad.phu_value("PIXSCALE")),
    }
}

fn read_mode(ad: &AstroData) -> DescriptorResult {
    // the number of non-destructive read pairs
    Ok(ad
        .phu_get("LNRS")
        .map(|lnrs| DescriptorValue::from(lnrs).to_string())
        .into())
}

// The telescope axes are swapped and reversed relative to the detector.
fn telescope_x_offset(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_get("YOFFSET").map(negated).into())
}

fn telescope_y_offset(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_get("XOFFSET").map(negated).into())
}

fn rotator_centre(ad: &AstroData) -> Option<(f64, f64)> {
    let (x, y) = ROTATOR_CENTRE;
    wcs_coordinates_at(ad, x, y)
}

fn wcs_ra(ad: &AstroData) -> DescriptorResult {
    Ok(rotator_centre(ad).map(|(ra, _)| ra).into())
}

fn wcs_dec(ad: &AstroData) -> DescriptorResult {
    Ok(rotator_centre(ad).map(|(_, dec)| dec).into())
}

fn obstype(ad: &AstroData) -> Option<&str> {
    ad.phu_str("OBSTYPE")
}

fn grism_is(ad: &AstroData, test: impl Fn(&str) -> bool) -> bool {
    ["GRISM", "GRISMPOS"]
        .iter()
        .any(|keyword| ad.phu_str(keyword).is_some_and(&test))
}

fn is_spect(ad: &AstroData) -> bool {
    grism_is(ad, |grism| {
        ["JH", "HK", "R3K"]
            .iter()
            .any(|prefix| grism.starts_with(prefix))
    })
}

fn decker_is(ad: &AstroData, decker: &str) -> bool {
    ad.phu_str("DECKER") == Some(decker) || ad.phu_str("DCKERPOS") == Some(decker)
}

fn tag_instrument(_: &AstroData) -> Option<TagSet> {
    Some(TagSet::new(&["F2"]))
}

fn tag_dark(ad: &AstroData) -> Option<TagSet> {
    let dark_filter = ["FILTER1", "FILTER2"]
        .iter()
        .any(|keyword| ad.phu_str(keyword).is_some_and(|f| f.starts_with("DK")));
    (dark_filter || obstype(ad) == Some("DARK"))
        .then(|| TagSet::new(&["DARK", "CAL"]).blocks(&["IMAGE", "SPECT"]))
}

fn tag_image(ad: &AstroData) -> Option<TagSet> {
    grism_is(ad, |grism| grism == "Open").then(|| TagSet::new(&["IMAGE"]))
}

fn tag_long_slit(ad: &AstroData) -> Option<TagSet> {
    if !is_spect(ad) {
        return None;
    }
    let slit = ad
        .phu_str("MOSPOS")
        .is_some_and(|position| PIXEL_SLIT.is_match(position));
    (decker_is(ad, "Long_slit") || slit).then(|| TagSet::new(&["LS", "SPECT"]))
}

fn tag_multi_object(ad: &AstroData) -> Option<TagSet> {
    if !is_spect(ad) {
        return None;
    }
    let mos_position = ad.phu_str("MOSPOS").is_some_and(|p| p.starts_with("mos"));
    (decker_is(ad, "mos") || mos_position).then(|| TagSet::new(&["MOS", "SPECT"]))
}

fn tag_arc(ad: &AstroData) -> Option<TagSet> {
    (obstype(ad)? == "ARC").then(|| TagSet::new(&["ARC", "CAL"]))
}

fn tag_flat(ad: &AstroData) -> Option<TagSet> {
    (obstype(ad)? == "FLAT").then(|| TagSet::new(&["FLAT", "CAL"]))
}

fn tag_twilight(ad: &AstroData) -> Option<TagSet> {
    if ad.phu_str("OBJECT")?.to_uppercase() != "TWILIGHT" {
        return None;
    }
    let tags = TagSet::new(&["TWILIGHT", "CAL"]);
    if ad.phu_str("GRISM") != Some("Open") {
        Some(tags.blocks(&["FLAT"]))
    } else {
        Some(tags)
    }
}

fn tag_disperser(ad: &AstroData) -> Option<TagSet> {
    let disperser = ad.phu_str("DISPERSR")?;
    if disperser.starts_with("DISP_WOLLASTON") {
        Some(TagSet::new(&["POL"]))
    } else if disperser.starts_with("DISP_PRISM") {
        Some(TagSet::new(&["SPECT", "IFU"]))
    } else {
        None
    }
}
