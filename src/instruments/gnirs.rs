//! The Gemini Near-Infrared Spectrograph.
use super::{
    gemini::{target_dec_degrees, target_ra_degrees},
    Accessor, DescriptorResult, TagRule,
};
use crate::astrodata::{AstroData, DescriptorError, DescriptorValue, Section, TagSet};
use regex::Regex;
use std::sync::LazyLock;

pub(super) static KEYWORDS: &[(&str, &str)] = &[("central_wavelength", "GRATWAVE")];

pub(super) static DESCRIPTORS: &[(&str, Accessor)] = &[
    ("array_section", full_frame),
    ("data_section", full_frame),
    ("dec", dec),
    ("detector_section", full_frame),
    ("disperser", disperser),
    ("focal_plane_mask", focal_plane_mask),
    ("grating", grating),
    ("pixel_scale", pixel_scale),
    ("prism", prism),
    ("ra", ra),
    ("slit", slit),
    ("well_depth_setting", well_depth_setting),
];

pub(super) static TAG_RULES: &[(&str, TagRule)] = &[
    ("arc", tag_arc),
    ("dark", tag_dark),
    ("flat", tag_flat),
    ("image", tag_image),
    ("instrument", tag_instrument),
    ("mask", tag_mask),
    ("spect", tag_spect),
];

// e.g. "111/mm_G5534" → "111/mm_G5534", "32/mmSB_G5533" → "32/mm_G5533"
static GRATING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\d/m]+)[A-Z]*(_G)(\d+)").expect("Failed to compile grating regex")
});

// e.g. "SXD_G5536" → "XD_G5536", "MIR_G5511" → "MIR_G5511"
static PRISM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[LBSR]*\+*([A-Z]*_G\d+)").expect("Failed to compile prism regex")
});

static IMAGING_CAMERA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Short|Long)(Red|Blue)_G\d+$").expect("Failed to compile camera regex")
});

// Targets further than this from the WCS position, in arcseconds, mean the
// WCS is not to be trusted.
const WCS_TOLERANCE: f64 = 1000.0;

fn full_frame(ad: &AstroData) -> DescriptorResult {
    let sections: Vec<Option<Section>> = ad
        .hdr_headers()
        .iter()
        .map(|h| {
            let naxis = |name: &str| h.get(name).and_then(|v| v.as_i64());
            Some(Section {
                x1: 0,
                x2: naxis("NAXIS1")?,
                y1: 0,
                y2: naxis("NAXIS2")?,
            })
        })
        .collect();
    Ok(sections.into())
}

fn grating(ad: &AstroData) -> DescriptorResult {
    let Some(grating) = ad.phu_str("GRATING") else {
        return Ok(ad.phu_value("GRATING"));
    };
    Ok(match GRATING.captures(grating) {
        Some(c) => format!("{}{}{}", &c[1], &c[2], &c[3]).into(),
        None => grating.into(),
    })
}

fn prism(ad: &AstroData) -> DescriptorResult {
    Ok(ad
        .phu_str("PRISM")
        .and_then(|prism| PRISM.captures(prism))
        .map(|c| c[1].to_string())
        .into())
}

fn disperser(ad: &AstroData) -> DescriptorResult {
    if ad.phu_str("ACQMIR") == Some("In") {
        return Ok("MIRROR".into());
    }
    let grating = ad.descriptor("grating")?;
    let prism = ad.descriptor("prism")?;
    let prism = prism
        .as_str()
        .ok_or_else(|| DescriptorError::evaluation("disperser", "the prism is not known"))?;
    if prism.starts_with("MIR") {
        return Ok(grating);
    }
    Ok(format!("{}&{}", grating, prism).into())
}

fn slit(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_str("SLIT").map(|slit| slit.replace(' ', "")).into())
}

fn focal_plane_mask(ad: &AstroData) -> DescriptorResult {
    let slit = ad.descriptor("slit")?;
    let decker = ad.descriptor("decker")?;
    Ok(match (slit.as_str(), decker.as_str()) {
        (Some(slit), Some(decker)) => format!(
            "{}&{}",
            slit.replace("Acquisition", "Acq"),
            decker.replace("Acquisition", "Acq")
        )
        .into(),
        _ => DescriptorValue::None,
    })
}

fn well_depth_setting(ad: &AstroData) -> DescriptorResult {
    let Some(bias) = ad.phu_f64("DETBIAS") else {
        return Ok(DescriptorValue::None);
    };
    let setting = if (0.3 - bias.abs()).abs() < 0.1 {
        "Shallow"
    } else if (0.6 - bias.abs()).abs() < 0.1 {
        "Deep"
    } else {
        "Unknown"
    };
    Ok(setting.into())
}

fn pixel_scale(ad: &AstroData) -> DescriptorResult {
    // spectroscopic pixel scales depend on the whole configuration
    if !(ad.has_tag("IMAGE") || ad.has_tag("DARK")) {
        return Ok(DescriptorValue::None);
    }
    let camera = ad.descriptor("camera")?;
    let scale = camera
        .as_str()
        .and_then(|camera| IMAGING_CAMERA.captures(camera))
        .map(|c| if &c[1] == "Short" { 0.15 } else { 0.05 });
    Ok(scale.into())
}

// Angular distance between two right ascensions or declinations, in arcseconds.
fn separation(a: f64, b: f64) -> f64 {
    let mut delta = (a - b).abs();
    if delta > 180.0 {
        delta = (delta - 360.0).abs();
    }
    delta * 3600.0
}

fn ra(ad: &AstroData) -> DescriptorResult {
    let wcs = ad.descriptor("wcs_ra")?.as_f64();
    let target = target_ra_degrees(ad, true)?;
    let ra = match (wcs, target) {
        (Some(wcs), Some(target)) => {
            let dec = ad.descriptor("dec")?.as_f64().unwrap_or(0.0);
            let delta = separation(wcs, target) / dec.to_radians().cos();
            if delta > WCS_TOLERANCE {
                target
            } else {
                wcs
            }
        }
        (wcs, target) => match wcs.or(target) {
            Some(ra) => ra,
            None => return Ok(DescriptorValue::None),
        },
    };
    Ok(ra.into())
}

fn dec(ad: &AstroData) -> DescriptorResult {
    let wcs = ad.descriptor("wcs_dec")?.as_f64();
    let target = target_dec_degrees(ad, true)?;
    Ok(match (wcs, target) {
        (Some(wcs), Some(target)) if separation(wcs, target) > WCS_TOLERANCE => target,
        (Some(wcs), _) => wcs,
        (None, target) => return Ok(target.into()),
    }
    .into())
}

fn obstype(ad: &AstroData) -> Option<&str> {
    ad.phu_str("OBSTYPE")
}

fn tag_instrument(_: &AstroData) -> Option<TagSet> {
    Some(TagSet::new(&["GNIRS"]))
}

fn tag_dark(ad: &AstroData) -> Option<TagSet> {
    (obstype(ad)? == "DARK").then(|| TagSet::new(&["DARK", "CAL"]).blocks(&["IMAGE", "SPECT"]))
}

fn tag_arc(ad: &AstroData) -> Option<TagSet> {
    (obstype(ad)? == "ARC").then(|| TagSet::new(&["ARC", "CAL"]))
}

fn tag_image(ad: &AstroData) -> Option<TagSet> {
    (ad.phu_str("ACQMIR")? == "In").then(|| TagSet::new(&["IMAGE"]))
}

fn tag_mask(ad: &AstroData) -> Option<TagSet> {
    let slit = ad.phu_str("SLIT").unwrap_or("");
    (!slit.contains("Acq")).then(|| TagSet::new(&["MASK"]).if_present(&["ACQUISITION"]))
}

fn tag_spect(ad: &AstroData) -> Option<TagSet> {
    if ad.phu_str("ACQMIR")? != "Out" {
        return None;
    }
    let slit = ad.phu_str("SLIT").unwrap_or("").to_lowercase();
    let grating = ad.phu_str("GRATING").unwrap_or("");
    let prism = ad.phu_str("PRISM").unwrap_or("");

    let mut tags = vec!["SPECT"];
    if slit == "ifu" {
        tags.push("IFU");
    } else if (slit.contains("arcsec") || slit.contains("pin")) && grating.contains("mm") {
        if prism.contains("MIR") {
            tags.push("LS");
        } else if prism.contains("XD") {
            tags.push("XD");
        }
    }
    Some(TagSet::new(&tags))
}

fn tag_flat(ad: &AstroData) -> Option<TagSet> {
    if obstype(ad)? != "FLAT" {
        return None;
    }
    if ad.phu_str("SLIT").is_some_and(|slit| slit.contains("Pinholes")) {
        Some(TagSet::new(&["PINHOLE", "CAL"]).remove(&["GCALFLAT"]))
    } else {
        Some(TagSet::new(&["FLAT", "CAL"]))
    }
}
