//! Descriptors and tags shared by all data taken at the Gemini telescopes.
use super::{
    common::{
        parse_date, parse_datetime, parse_percentile, parse_time, remove_component_id,
        section_to_tuple,
    },
    convert_units, Accessor, DescriptorResult, TagRule, Unit, Wcs,
};
use crate::{
    astrodata::{AstroData, Date, DateTime, DescriptorError, DescriptorValue, TagSet, Time},
    types::{Header, Value},
};
use regex::Regex;
use std::sync::LazyLock;

pub(super) static KEYWORDS: &[(&str, &str)] = &[
    ("airmass", "AIRMASS"),
    ("amp_read_area", "AMPROA"),
    ("ao_fold", "AOFOLD"),
    ("ao_seeing", "AOSEEING"),
    ("array_name", "ARRAYNAM"),
    ("array_section", "ARRAYSEC"),
    ("azimuth", "AZIMUTH"),
    ("bias_image", "BIASIM"),
    ("bunit", "BUNIT"),
    ("camera", "CAMERA"),
    ("cass_rotator_pa", "CRPA"),
    ("cd11", "CD1_1"),
    ("cd12", "CD1_2"),
    ("cd21", "CD2_1"),
    ("cd22", "CD2_2"),
    ("central_wavelength", "CWAVE"),
    ("coadds", "COADDS"),
    ("dark_image", "DARKIM"),
    ("data_label", "DATALAB"),
    ("data_section", "DATASEC"),
    ("dec", "DEC"),
    ("decker", "DECKER"),
    ("detector_name", "DETNAME"),
    ("detector_roi_setting", "DROISET"),
    ("detector_rois_requested", "DROIREQ"),
    ("detector_section", "DETSEC"),
    ("detector_x_bin", "XCCDBIN"),
    ("detector_y_bin", "YCCDBIN"),
    ("disperser", "DISPERSR"),
    ("dispersion", "WDELTA"),
    ("dispersion_axis", "DISPAXIS"),
    ("elevation", "ELEVATIO"),
    ("exposure_time", "EXPTIME"),
    ("filter_name", "FILTNAME"),
    ("focal_plane_mask", "FPMASK"),
    ("gain", "GAIN"),
    ("gain_setting", "GAINSET"),
    ("gems", "GWFS1CFG"),
    ("grating", "GRATING"),
    ("group_id", "GROUPID"),
    ("local_time", "LT"),
    ("lyot_stop", "LYOTSTOP"),
    ("mdf_row_id", "MDFROW"),
    ("naxis1", "NAXIS1"),
    ("naxis2", "NAXIS2"),
    ("nominal_atmospheric_extinction", "NOMATMOS"),
    ("nominal_photometric_zeropoint", "NOMPHOTZ"),
    ("non_linear_level", "NONLINEA"),
    ("observation_epoch", "OBSEPOCH"),
    ("oiwfs", "OIWFS_ST"),
    ("overscan_section", "OVERSSEC"),
    ("pixel_scale", "PIXSCALE"),
    ("prism", "PRISM"),
    ("pupil_mask", "PUPILMSK"),
    ("pwfs1", "PWFS1_ST"),
    ("pwfs2", "PWFS2_ST"),
    ("qa_state", "QASTATE"),
    ("r_zero_val", "RZEROVAL"),
    ("ra", "RA"),
    ("raw_central_wavelength", "CWAVE"),
    ("raw_gemini_qa", "RAWGEMQA"),
    ("raw_pi_requirements_met", "RAWPIREQ"),
    ("read_mode", "READMODE"),
    ("read_noise", "RDNOISE"),
    ("read_speed_setting", "RDSPDSET"),
    ("saturation_level", "SATLEVEL"),
    ("slit", "SLIT"),
    ("telescope_x_offset", "XOFFSET"),
    ("telescope_y_offset", "YOFFSET"),
    ("ut_datetime", "DATETIME"),
    ("ut_time", "UT"),
    ("wavefront_sensor", "WFS"),
    ("wavelength", "WAVELENG"),
    ("wavelength_band", "WAVEBAND"),
    ("wavelength_reference_pixel", "WREFPIX"),
    ("well_depth_setting", "WELDEPTH"),
];

pub(super) static DESCRIPTORS: &[(&str, Accessor)] = &[
    ("airmass", airmass),
    ("amp_read_area", amp_read_area),
    ("ao_seeing", ao_seeing),
    ("array_name", array_name),
    ("array_section", array_section),
    ("azimuth", azimuth),
    ("calibration_key", calibration_key),
    ("camera", camera),
    ("cass_rotator_pa", cass_rotator_pa),
    ("central_wavelength", central_wavelength),
    ("coadds", coadds),
    ("data_label", data_label),
    ("data_section", data_section),
    ("dec", dec),
    ("decker", decker),
    ("detector_name", detector_name),
    ("detector_roi_setting", detector_roi_setting),
    ("detector_rois_requested", detector_rois_requested),
    ("detector_section", detector_section),
    ("detector_x_bin", detector_x_bin),
    ("detector_x_offset", detector_x_offset),
    ("detector_y_bin", detector_y_bin),
    ("detector_y_offset", detector_y_offset),
    ("disperser", disperser),
    ("dispersion", dispersion),
    ("dispersion_axis", dispersion_axis),
    ("elevation", elevation),
    ("exposure_time", exposure_time),
    ("filter_name", filter_name),
    ("focal_plane_mask", focal_plane_mask),
    ("gain", gain),
    ("gain_setting", gain_setting),
    ("gcal_lamp", gcal_lamp),
    ("grating", grating),
    ("group_id", group_id),
    ("is_ao", is_ao),
    ("is_coadds_summed", is_coadds_summed),
    ("local_time", local_time),
    ("lyot_stop", lyot_stop),
    ("mdf_row_id", mdf_row_id),
    ("nominal_photometric_zeropoint", nominal_photometric_zeropoint),
    ("non_linear_level", non_linear_level),
    ("observation_class", observation_class),
    ("observation_id", observation_id),
    ("observation_type", observation_type),
    ("overscan_section", overscan_section),
    ("pixel_scale", pixel_scale),
    ("prism", prism),
    ("program_id", program_id),
    ("pupil_mask", pupil_mask),
    ("qa_state", qa_state),
    ("ra", ra),
    ("raw_bg", raw_bg),
    ("raw_cc", raw_cc),
    ("raw_iq", raw_iq),
    ("raw_wv", raw_wv),
    ("read_mode", read_mode),
    ("read_noise", read_noise),
    ("requested_bg", requested_bg),
    ("requested_cc", requested_cc),
    ("requested_iq", requested_iq),
    ("requested_wv", requested_wv),
    ("saturation_level", saturation_level),
    ("slit", slit),
    ("target_dec", target_dec),
    ("target_ra", target_ra),
    ("telescope_x_offset", telescope_x_offset),
    ("telescope_y_offset", telescope_y_offset),
    ("ut_date", ut_date),
    ("ut_datetime", ut_datetime),
    ("ut_time", ut_time),
    ("wavefront_sensor", wavefront_sensor),
    ("wavelength_reference_pixel", wavelength_reference_pixel),
    ("wcs_dec", wcs_dec),
    ("wcs_ra", wcs_ra),
    ("well_depth_setting", well_depth_setting),
];

pub(super) static TAG_RULES: &[(&str, TagRule)] = &[
    ("acquisition", tag_acquisition),
    ("az_el_target", tag_az_el_target),
    ("bad_pixel_mask", tag_bad_pixel_mask),
    ("fringe", tag_fringe),
    ("gcal_ir", tag_gcal_ir),
    ("gcal_ir_flat", tag_gcal_ir_flat),
    ("gemini", tag_gemini),
    ("nod_and_chop", tag_nod_and_chop),
    ("overscan", tag_overscan),
    ("prepared", tag_prepared),
    ("processed_calibration", tag_processed_calibration),
    ("processed_science", tag_processed_science),
    ("raw", tag_raw),
    ("sidereal", tag_sidereal),
    ("site", tag_site),
];

// A date and time at the start of the value, as written by newer software.
static FULL_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d\d\d\d-[01]\d-[0123]\d)T([012]\d:[012345]\d:\d\d(?:\.\d*)?)")
        .expect("Failed to compile date and time regex")
});

static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d\d\d\d-[01]\d-[0123]\d").expect("Failed to compile date regex")
});

// DD/MM/YY, years counted from 1900.
static OLD_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0123]\d)/([01]\d)/(\d\d+)$").expect("Failed to compile old style date regex")
});

static UT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([012]?\d):([012345]?\d):(\d\d?\.?\d*)$").expect("Failed to compile time regex")
});

/// The raw primary header value of the keyword associated with `generic`.
pub(super) fn phu_keyword_value(ad: &AstroData, generic: &'static str) -> DescriptorResult {
    Ok(ad.phu_value(ad.keyword_for(generic)?))
}

/// One value per extension of the keyword associated with `generic`.
pub(super) fn hdr_keyword_value(ad: &AstroData, generic: &'static str) -> DescriptorResult {
    Ok(ad.hdr_value(ad.keyword_for(generic)?))
}

/// The sections in `keyword` of every extension, `None` where it is absent.
pub(super) fn sections(ad: &AstroData, descriptor: &'static str, keyword: &str) -> DescriptorResult {
    ad.hdr_get(keyword)
        .into_iter()
        .map(|value| match value {
            None => Ok(DescriptorValue::None),
            Some(value) => value
                .as_str()
                .and_then(section_to_tuple)
                .map(DescriptorValue::from)
                .ok_or_else(|| {
                    DescriptorError::evaluation(descriptor, format!("{} is not a section", value))
                }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(DescriptorValue::List)
}

/// `value` multiplied by `factor`, keeping integers integral.
fn times(value: &Value<'_>, factor: i64) -> DescriptorValue {
    match value {
        Value::Integer(n) => DescriptorValue::Int(n * factor),
        Value::Real(f) => DescriptorValue::Float(f * factor as f64),
        other => other.into(),
    }
}

/// The filter names with component IDs, open positions and neutral density
/// filters removed, joined with `&`.
pub(super) fn pretty_filter_name(filter1: &str, filter2: &str) -> String {
    let filter1 = remove_component_id(filter1);
    let filter2 = remove_component_id(filter2);
    let mut names: Vec<&str> = [filter1, filter2]
        .into_iter()
        .filter(|name| {
            let lower = name.to_lowercase();
            !(lower.contains("open") || name.contains("Clear") || lower.starts_with("nd"))
        })
        .collect();
    if names.is_empty() {
        names.push("open");
    }
    for (marker, name) in [("Block", "blank"), ("Dark", "blank"), ("DK", "dark")] {
        if filter1.contains(marker) || filter2.contains(marker) {
            names.push(name);
        }
    }
    names.truncate(2);
    names.join("&")
}

/// The header holding the sky WCS: the first extension when it has `CTYPE1`
/// and `CTYPE2`, otherwise the primary header when it does.
pub(super) fn wcs_header(ad: &AstroData) -> Option<&Header<'static>> {
    let has_ctypes = |h: &Header<'_>| h.contains("CTYPE1") && h.contains("CTYPE2");
    match ad.extensions().first() {
        Some(first) if has_ctypes(first) => Some(first),
        _ => Some(ad.phu()).filter(|phu| has_ctypes(phu)),
    }
}

/// Right ascension and declination of a pixel, in degrees.
pub(super) fn wcs_coordinates_at(ad: &AstroData, x: f64, y: f64) -> Option<(f64, f64)> {
    let wcs = Wcs::from_header(wcs_header(ad)?)?;
    Some(wcs.pixel_to_world(x, y))
}

fn wcs_centre(ad: &AstroData) -> Option<(f64, f64)> {
    let image = ad.extensions().first().unwrap_or_else(|| ad.phu());
    let x = 0.5 * image.get("NAXIS1")?.as_f64()?;
    let y = 0.5 * image.get("NAXIS2")?.as_f64()?;
    wcs_coordinates_at(ad, x, y)
}

/// Mean pixel scale, in arcseconds, from the CD matrices of all extensions.
pub(super) fn wcs_pixel_scale(ad: &AstroData) -> Option<f64> {
    let scales = ad
        .hdr_headers()
        .iter()
        .map(|h| {
            let cd = |name: &str| h.get(name).and_then(Value::as_f64);
            let x = cd("CD1_1")?.hypot(cd("CD1_2")?);
            let y = cd("CD2_1")?.hypot(cd("CD2_2")?);
            Some(3600.0 * 0.5 * (x + y))
        })
        .collect::<Option<Vec<f64>>>()?;
    Some(scales.iter().sum::<f64>() / scales.len() as f64)
}

/// `POFFSET` or `QOFFSET` converted to pixels.
pub(super) fn offset_in_pixels(ad: &AstroData, keyword: &str) -> Result<Option<f64>, DescriptorError> {
    let scale = ad.descriptor("pixel_scale")?.as_f64();
    Ok(ad.phu_f64(keyword).zip(scale).map(|(offset, scale)| offset / scale))
}

pub(super) fn inport_is_one(ad: &AstroData) -> bool {
    ad.phu_f64("INPORT") == Some(1.0)
}

fn airmass(ad: &AstroData) -> DescriptorResult {
    let value = ad.phu_get(ad.keyword_for("airmass")?);
    Ok(value
        .filter(|v| v.as_f64().is_some_and(|a| a >= 1.0))
        .into())
}

fn amp_read_area(ad: &AstroData) -> DescriptorResult {
    sections(ad, "amp_read_area", ad.keyword_for("amp_read_area")?)
}

fn ao_seeing(ad: &AstroData) -> DescriptorResult {
    if let Some(seeing) = ad.phu_get(ad.keyword_for("ao_seeing")?) {
        return Ok(seeing.into());
    }
    // Fried parameter in cm, at 500nm
    Ok(ad
        .phu_f64(ad.keyword_for("r_zero_val")?)
        .map(|r0| (206265.0 * 0.98 * 0.5e-6) / (r0 * 0.01))
        .into())
}

fn array_name(ad: &AstroData) -> DescriptorResult {
    hdr_keyword_value(ad, "array_name")
}

fn array_section(ad: &AstroData) -> DescriptorResult {
    sections(ad, "array_section", ad.keyword_for("array_section")?)
}

fn azimuth(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "azimuth")
}

fn calibration_key(ad: &AstroData) -> DescriptorResult {
    let label = ad.descriptor("data_label")?;
    let label = label
        .as_str()
        .ok_or_else(|| DescriptorError::missing("calibration_key", "DATALAB"))?;
    Ok(label.replace("_stack", "").into())
}

fn camera(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "camera")
}

fn cass_rotator_pa(ad: &AstroData) -> DescriptorResult {
    let angle = ad.phu_get(ad.keyword_for("cass_rotator_pa")?);
    Ok(angle
        .filter(|v| v.as_f64().is_some_and(|a| a.abs() <= 360.0))
        .into())
}

fn central_wavelength(ad: &AstroData) -> DescriptorResult {
    let microns = ad.phu_f64(ad.keyword_for("central_wavelength")?).unwrap_or(-1.0);
    if microns < 0.0 {
        return Ok(DescriptorValue::None);
    }
    Ok(convert_units(Unit::Micrometers, microns, Unit::Meters).into())
}

fn coadds(ad: &AstroData) -> DescriptorResult {
    let coadds = ad.phu_f64(ad.keyword_for("coadds")?).unwrap_or(1.0);
    Ok(DescriptorValue::Int(coadds as i64))
}

fn data_label(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "data_label")
}

fn data_section(ad: &AstroData) -> DescriptorResult {
    sections(ad, "data_section", ad.keyword_for("data_section")?)
}

fn dec(ad: &AstroData) -> DescriptorResult {
    ad.descriptor("wcs_dec")
}

fn decker(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "decker")
}

fn detector_name(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "detector_name")
}

fn detector_roi_setting(_: &AstroData) -> DescriptorResult {
    Ok("Fixed".into())
}

fn detector_rois_requested(_: &AstroData) -> DescriptorResult {
    Ok(DescriptorValue::None)
}

fn detector_section(ad: &AstroData) -> DescriptorResult {
    sections(ad, "detector_section", ad.keyword_for("detector_section")?)
}

fn detector_x_bin(ad: &AstroData) -> DescriptorResult {
    Ok(ad
        .phu_get(ad.keyword_for("detector_x_bin")?)
        .map_or(DescriptorValue::Int(1), DescriptorValue::from))
}

fn detector_y_bin(ad: &AstroData) -> DescriptorResult {
    Ok(ad
        .phu_get(ad.keyword_for("detector_y_bin")?)
        .map_or(DescriptorValue::Int(1), DescriptorValue::from))
}

fn detector_x_offset(ad: &AstroData) -> DescriptorResult {
    let offset = offset_in_pixels(ad, "POFFSET")?;
    let flip = if inport_is_one(ad) { -1.0 } else { 1.0 };
    Ok(offset.map(|x| flip * x).into())
}

fn detector_y_offset(ad: &AstroData) -> DescriptorResult {
    let offset = offset_in_pixels(ad, "QOFFSET")?;
    let flip = if inport_is_one(ad) { -1.0 } else { 1.0 };
    Ok(offset.map(|y| flip * y).into())
}

fn disperser(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "disperser")
}

fn dispersion(ad: &AstroData) -> DescriptorResult {
    let keyword = ad.keyword_for("dispersion")?;
    let per_extension = ad.hdr_f64(keyword);
    if per_extension.iter().all(Option::is_some) {
        return Ok(per_extension.into());
    }
    Ok(match ad.phu_f64(keyword) {
        Some(dispersion) => vec![dispersion; per_extension.len()].into(),
        None => DescriptorValue::None,
    })
}

fn dispersion_axis(ad: &AstroData) -> DescriptorResult {
    if ad.has_tag("IMAGE") || !ad.has_tag("PREPARED") {
        return Ok(DescriptorValue::None);
    }
    let keyword = ad.keyword_for("dispersion_axis")?;
    ad.hdr_f64(keyword)
        .into_iter()
        .map(|axis| {
            axis.map(|a| DescriptorValue::Int(a as i64))
                .ok_or_else(|| DescriptorError::missing("dispersion_axis", keyword))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(DescriptorValue::List)
}

fn elevation(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "elevation")
}

fn exposure_time(ad: &AstroData) -> DescriptorResult {
    let exposure = ad
        .phu_get(ad.keyword_for("exposure_time")?)
        .filter(|v| v.as_f64().is_some_and(|t| t >= 0.0));
    let Some(exposure) = exposure else {
        return Ok(DescriptorValue::None);
    };
    let summed = ad.descriptor("is_coadds_summed")? == DescriptorValue::Bool(true);
    if summed && !ad.has_tag("PREPARED") {
        let coadds = ad.descriptor("coadds")?.as_i64().unwrap_or(1);
        return Ok(times(exposure, coadds));
    }
    Ok(exposure.into())
}

fn filter_name(ad: &AstroData) -> DescriptorResult {
    Ok(ad
        .phu_str("FILTER1")
        .zip(ad.phu_str("FILTER2"))
        .map(|(f1, f2)| format!("{}&{}", f1, f2))
        .into())
}

fn focal_plane_mask(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "focal_plane_mask")
}

fn gain(ad: &AstroData) -> DescriptorResult {
    hdr_keyword_value(ad, "gain")
}

fn gain_setting(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "gain_setting")
}

fn gcal_lamp(ad: &AstroData) -> DescriptorResult {
    let (Some(lamps), Some(shutter)) = (ad.phu_str("GCALLAMP"), ad.phu_str("GCALSHUT")) else {
        return Ok("None".into());
    };
    let lamps_upper = lamps.to_uppercase();
    let ir_behind_shutter = shutter.to_uppercase() == "CLOSED"
        && matches!(lamps_upper.as_str(), "IRHIGH" | "IRLOW");
    if ir_behind_shutter || matches!(lamps_upper.as_str(), "" | "NO VALUE") {
        return Ok("Off".into());
    }
    Ok(lamps.into())
}

fn grating(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "grating")
}

fn group_id(ad: &AstroData) -> DescriptorResult {
    ad.descriptor("observation_id")
}

fn is_ao(ad: &AstroData) -> DescriptorResult {
    let fold = ad.phu_str(ad.keyword_for("ao_fold")?).unwrap_or("OUT");
    Ok((fold == "IN").into())
}

fn is_coadds_summed(_: &AstroData) -> DescriptorResult {
    Ok(true.into())
}

fn local_time(ad: &AstroData) -> DescriptorResult {
    let keyword = ad.keyword_for("local_time")?;
    Ok(ad.phu_str(keyword).and_then(parse_time).into())
}

fn lyot_stop(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "lyot_stop")
}

fn mdf_row_id(ad: &AstroData) -> DescriptorResult {
    if ad.has_tag("IMAGE") || !ad.has_tag("PREPARED") {
        return Ok(DescriptorValue::None);
    }
    hdr_keyword_value(ad, "mdf_row_id")
}

fn nominal_photometric_zeropoint(ad: &AstroData) -> DescriptorResult {
    hdr_keyword_value(ad, "nominal_photometric_zeropoint")
}

fn non_linear_level(ad: &AstroData) -> DescriptorResult {
    hdr_keyword_value(ad, "non_linear_level")
}

fn observation_class(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value("OBSCLASS"))
}

fn observation_id(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value("OBSID"))
}

fn observation_type(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value("OBSTYPE"))
}

fn overscan_section(ad: &AstroData) -> DescriptorResult {
    sections(ad, "overscan_section", ad.keyword_for("overscan_section")?)
}

fn pixel_scale(ad: &AstroData) -> DescriptorResult {
    Ok(wcs_pixel_scale(ad).into())
}

fn prism(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "prism")
}

fn program_id(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value("GEMPRGID"))
}

fn pupil_mask(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "pupil_mask")
}

fn qa_state(ad: &AstroData) -> DescriptorResult {
    fn required<'a>(ad: &'a AstroData, generic: &'static str) -> Result<&'a str, DescriptorError> {
        let keyword = ad.keyword_for(generic)?;
        ad.phu_str(keyword)
            .ok_or_else(|| DescriptorError::missing("qa_state", keyword))
    }
    let pi_requirements = required(ad, "raw_pi_requirements_met")?;
    let gemini_qa = required(ad, "raw_gemini_qa")?;

    let pair = [pi_requirements, gemini_qa];
    let state = if pair.contains(&"UNKNOWN") {
        "Undefined".to_string()
    } else if pi_requirements == "YES" && gemini_qa == "USABLE" {
        "Pass".to_string()
    } else if pi_requirements == "NO" && gemini_qa == "USABLE" {
        "Usable".to_string()
    } else if gemini_qa.to_uppercase() == "BAD" {
        "Fail".to_string()
    } else if pair.contains(&"CHECK") {
        "CHECK".to_string()
    } else {
        format!("{}:{}", pi_requirements, gemini_qa)
    };
    Ok(state.into())
}

fn ra(ad: &AstroData) -> DescriptorResult {
    ad.descriptor("wcs_ra")
}

fn percentile(ad: &AstroData, keyword: &str) -> DescriptorResult {
    Ok(ad.phu_str(keyword).and_then(parse_percentile).into())
}

fn raw_bg(ad: &AstroData) -> DescriptorResult {
    percentile(ad, "RAWBG")
}

fn raw_cc(ad: &AstroData) -> DescriptorResult {
    percentile(ad, "RAWCC")
}

fn raw_iq(ad: &AstroData) -> DescriptorResult {
    percentile(ad, "RAWIQ")
}

fn raw_wv(ad: &AstroData) -> DescriptorResult {
    percentile(ad, "RAWWV")
}

fn requested_bg(ad: &AstroData) -> DescriptorResult {
    percentile(ad, "REQBG")
}

fn requested_cc(ad: &AstroData) -> DescriptorResult {
    percentile(ad, "REQCC")
}

fn requested_iq(ad: &AstroData) -> DescriptorResult {
    percentile(ad, "REQIQ")
}

fn requested_wv(ad: &AstroData) -> DescriptorResult {
    percentile(ad, "REQWV")
}

fn read_mode(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "read_mode")
}

fn read_noise(ad: &AstroData) -> DescriptorResult {
    hdr_keyword_value(ad, "read_noise")
}

fn saturation_level(ad: &AstroData) -> DescriptorResult {
    hdr_keyword_value(ad, "saturation_level")
}

fn slit(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "slit")
}

// Years between the catalogue epoch and the observation, for proper motions.
fn years_since_epoch(ad: &AstroData, descriptor: &'static str) -> Result<f64, DescriptorError> {
    let epoch = ad.phu_f64("EPOCH").unwrap_or(2000.0);
    let observed = observation_moment(ad, false, Part::Full)?
        .as_datetime()
        .ok_or_else(|| {
            DescriptorError::evaluation(descriptor, "proper motion needs the time of observation")
        })?;
    let year = observed.fractional_year().ok_or_else(|| {
        DescriptorError::evaluation(descriptor, "the time of observation is not a calendar date")
    })?;
    Ok(year - epoch)
}

/// Declination of the target in degrees, corrected for proper motion and,
/// with `offset`, for the telescope offsets.
pub(super) fn target_dec_degrees(ad: &AstroData, offset: bool) -> Result<Option<f64>, DescriptorError> {
    let Some(mut dec) = ad.phu_f64("DEC") else {
        return Ok(None);
    };
    if offset {
        let arcsec = ad.phu_f64("DECOFFSE").unwrap_or(0.0) + ad.phu_f64("DECTRGOF").unwrap_or(0.0);
        dec += arcsec / 3600.0;
    }
    let pm_dec = ad.phu_f64("PMDEC").unwrap_or(0.0);
    if pm_dec != 0.0 {
        dec += pm_dec * years_since_epoch(ad, "target_dec")? / 3600.0;
    }
    Ok(Some(dec))
}

/// Right ascension of the target in degrees, corrected like
/// [`target_dec_degrees`].
pub(super) fn target_ra_degrees(ad: &AstroData, offset: bool) -> Result<Option<f64>, DescriptorError> {
    let Some(mut ra) = ad.phu_f64("RA") else {
        return Ok(None);
    };
    let cos_dec = || -> Result<f64, DescriptorError> {
        target_dec_degrees(ad, true)?
            .map(|dec| dec.to_radians().cos())
            .ok_or_else(|| DescriptorError::missing("target_ra", "DEC"))
    };
    if offset {
        let arcsec = ad.phu_f64("RAOFFSET").unwrap_or(0.0) + ad.phu_f64("RATRGOFF").unwrap_or(0.0);
        ra += arcsec / 3600.0 / cos_dec()?;
    }
    let pm_ra = ad.phu_f64("PMRA").unwrap_or(0.0);
    if pm_ra != 0.0 {
        // PMRA is in seconds of time per year
        ra += pm_ra * years_since_epoch(ad, "target_ra")? * 15.0 * cos_dec()? / 3600.0;
    }
    Ok(Some(ra))
}

fn target_dec(ad: &AstroData) -> DescriptorResult {
    Ok(target_dec_degrees(ad, false)?.into())
}

fn target_ra(ad: &AstroData) -> DescriptorResult {
    Ok(target_ra_degrees(ad, false)?.into())
}

fn telescope_x_offset(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "telescope_x_offset")
}

fn telescope_y_offset(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "telescope_y_offset")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Full,
    Date,
    Time,
}

impl Part {
    fn of(self, moment: DateTime) -> DescriptorValue {
        match self {
            Part::Full => moment.into(),
            Part::Date => moment.date.into(),
            Part::Time => moment.time.into(),
        }
    }
}

fn unreadable(text: &str) -> DescriptorError {
    DescriptorError::evaluation("ut_datetime", format!("{:?} is not a valid date or time", text))
}

fn old_style_date(text: &str) -> Option<Date> {
    let c = OLD_DATE.captures(text)?;
    let year: i32 = c[3].parse().ok()?;
    Date::new(year.checked_add(1900)?, c[2].parse().ok()?, c[1].parse().ok()?)
}

// `N20170101S0001` → 2017-01-01
fn date_from_frame_name(name: &str) -> Option<Date> {
    let year: i32 = name.get(1..5)?.parse().ok()?;
    let month: u32 = name.get(5..7)?.parse().ok()?;
    let day: u32 = name.get(7..9)?.parse().ok()?;
    if year > 1999 && month < 13 && day < 32 {
        Date::new(year, month, day)
    } else {
        None
    }
}

/// The time of observation, from whichever keywords the headers have.
///
/// Dates are looked for in `DATE-OBS`, the class' date keyword, `DATE` and
/// `UTDATE`; times in the class' time keyword, `UT`, `TIME-OBS`, `STARTUT`
/// and `UTSTART`. `MJD_OBS` and `OBSSTART` are tried next. Unless `strict`,
/// a date is finally taken from the frame or file name and a missing time
/// defaults to midnight.
fn observation_moment(ad: &AstroData, strict: bool, part: Part) -> DescriptorResult {
    let mut date = None;
    for keyword in ["DATE-OBS", ad.keyword_for("ut_date")?, "DATE", "UTDATE"] {
        let text = ad.phu_str(keyword).unwrap_or("").trim();
        if let Some(c) = FULL_DATETIME.captures(text) {
            let moment = parse_datetime(&format!("{}T{}", &c[1], &c[2]))
                .ok_or_else(|| unreadable(text))?;
            return Ok(part.of(moment));
        }
        if let Some(m) = DATE_PREFIX.find(text) {
            date = Some(parse_date(m.as_str()).ok_or_else(|| unreadable(text))?);
            break;
        }
        if OLD_DATE.is_match(text) {
            date = Some(old_style_date(text).ok_or_else(|| unreadable(text))?);
            break;
        }
    }
    if let (Part::Date, Some(date)) = (part, date) {
        return Ok(date.into());
    }

    let mut time: Option<Time> = None;
    for keyword in [ad.keyword_for("ut_time")?, "UT", "TIME-OBS", "STARTUT", "UTSTART"] {
        let text = ad.phu_str(keyword).unwrap_or("").trim();
        if UT_TIME.is_match(text) {
            time = Some(parse_time(text).ok_or_else(|| unreadable(text))?);
            break;
        }
    }
    if let (Part::Time, Some(time)) = (part, time) {
        return Ok(time.into());
    }

    if let (Some(date), Some(time)) = (date, time) {
        return Ok(part.of(DateTime::new(date, time)));
    }

    if let Some(moment) = ad
        .phu_f64("MJD_OBS")
        .filter(|mjd| *mjd > 1.0)
        .and_then(DateTime::from_mjd)
    {
        return Ok(part.of(moment));
    }

    if let Some(start) = ad.phu_str("OBSSTART").filter(|s| !s.trim().is_empty()) {
        let moment = parse_datetime(start).ok_or_else(|| unreadable(start))?;
        return Ok(part.of(moment));
    }

    if strict {
        return Ok(DescriptorValue::None);
    }

    if date.is_none() {
        let frame_names = ad.hdr_str("FRMNAME");
        let names = frame_names
            .iter()
            .map(|name| name.unwrap_or(""))
            .chain(std::iter::once(ad.filename()));
        for name in names {
            if let Some(found) = date_from_frame_name(name) {
                date = Some(found);
            }
        }
    }
    let time = time.unwrap_or_default();
    Ok(match (part, date) {
        (Part::Time, _) => time.into(),
        (_, Some(date)) => part.of(DateTime::new(date, time)),
        (_, None) => DescriptorValue::None,
    })
}

fn ut_date(ad: &AstroData) -> DescriptorResult {
    observation_moment(ad, true, Part::Date)
}

fn ut_datetime(ad: &AstroData) -> DescriptorResult {
    observation_moment(ad, false, Part::Full)
}

fn ut_time(ad: &AstroData) -> DescriptorResult {
    observation_moment(ad, true, Part::Time)
}

fn wavefront_sensor(ad: &AstroData) -> DescriptorResult {
    let mut sensors: Vec<&str> = [
        ("AOWFS_ST", "AOWFS"),
        ("OIWFS_ST", "OIWFS"),
        ("PWFS1_ST", "PWFS1"),
        ("PWFS2_ST", "PWFS2"),
    ]
    .into_iter()
    .filter(|(keyword, _)| ad.phu_str(keyword) == Some("guiding"))
    .map(|(_, sensor)| sensor)
    .collect();
    if ad.phu_contains(ad.keyword_for("gems")?) {
        sensors.push("GEMS");
    }
    if sensors.is_empty() {
        return Ok(DescriptorValue::None);
    }
    sensors.sort_unstable();
    Ok(sensors.join("&").into())
}

fn wavelength_reference_pixel(ad: &AstroData) -> DescriptorResult {
    hdr_keyword_value(ad, "wavelength_reference_pixel")
}

fn wcs_dec(ad: &AstroData) -> DescriptorResult {
    Ok(wcs_centre(ad).map(|(_, dec)| dec).into())
}

fn wcs_ra(ad: &AstroData) -> DescriptorResult {
    Ok(wcs_centre(ad).map(|(ra, _)| ra).into())
}

fn well_depth_setting(ad: &AstroData) -> DescriptorResult {
    phu_keyword_value(ad, "well_depth_setting")
}

fn tag_gemini(_: &AstroData) -> Option<TagSet> {
    Some(TagSet::new(&["GEMINI"]))
}

fn tag_acquisition(ad: &AstroData) -> Option<TagSet> {
    matches!(ad.phu_str("OBSCLASS"), Some("acq" | "acqCal")).then(|| TagSet::new(&["ACQUISITION"]))
}

fn tag_az_el_target(ad: &AstroData) -> Option<TagSet> {
    if ad.phu_str("FRAME")? != "AZEL_TOPO" {
        return None;
    }
    if ad.phu_f64("ELEVATIO").is_some_and(|elevation| elevation >= 90.0) {
        Some(TagSet::new(&["AZEL_TARGET", "AT_ZENITH"]))
    } else {
        Some(TagSet::new(&["AZEL_TARGET"]))
    }
}

fn tag_fringe(ad: &AstroData) -> Option<TagSet> {
    ad.phu_contains("GIFRINGE").then(|| TagSet::new(&["FRINGE"]))
}

fn tag_gcal_ir_flat(ad: &AstroData) -> Option<TagSet> {
    (ad.phu_str("GCALLAMP")? == "IRhigh").then(|| TagSet::new(&["GCALFLAT", "FLAT", "CAL"]))
}

fn tag_gcal_ir(ad: &AstroData) -> Option<TagSet> {
    if ad.phu_str("GCALLAMP")? != "IRhigh" {
        return None;
    }
    match ad.phu_str("GCALSHUT")? {
        "OPEN" => Some(TagSet::new(&["GCAL_IR_ON", "LAMPON"]).blocked_by(&["PROCESSED"])),
        "CLOSED" => Some(TagSet::new(&["GCAL_IR_OFF", "LAMPOFF"]).blocked_by(&["PROCESSED"])),
        _ => None,
    }
}

fn tag_site(ad: &AstroData) -> Option<TagSet> {
    match ad.phu_str("OBSERVAT")?.to_uppercase().as_str() {
        "GEMINI-NORTH" => Some(TagSet::new(&["NORTH"])),
        "GEMINI-SOUTH" => Some(TagSet::new(&["SOUTH"])),
        _ => None,
    }
}

fn tag_nod_and_chop(ad: &AstroData) -> Option<TagSet> {
    (ad.phu_str("DATATYPE")? == "marked-nodandchop").then(|| TagSet::new(&["NODCHOP"]))
}

fn tag_sidereal(ad: &AstroData) -> Option<TagSet> {
    let frames = [ad.phu_str("TRKFRAME"), ad.phu_str("FRAME")];
    if !frames.iter().any(|frame| matches!(frame, Some("FK5" | "APPT"))) {
        return None;
    }
    let tracking = |keyword: &str| {
        ad.phu_get(keyword)
            .and_then(|v| v.as_f64().or_else(|| v.as_str()?.trim().parse().ok()))
    };
    match (tracking("DECTRACK"), tracking("RATRACK")) {
        (Some(dec), Some(ra)) if dec == 0.0 && ra == 0.0 => Some(TagSet::new(&["SIDEREAL"])),
        _ => Some(TagSet::new(&["NON_SIDEREAL"])),
    }
}

fn tag_bad_pixel_mask(ad: &AstroData) -> Option<TagSet> {
    ad.phu_contains("BPMASK").then(|| TagSet::new(&["BPM"]))
}

fn tag_raw(ad: &AstroData) -> Option<TagSet> {
    (!ad.phu_contains("GEM-TLM")).then(|| TagSet::new(&["RAW"]))
}

fn tag_prepared(ad: &AstroData) -> Option<TagSet> {
    if ad.phu_keywords().any(|keyword| keyword.contains("PREPAR")) {
        Some(TagSet::new(&["PREPARED"]))
    } else {
        Some(TagSet::new(&["UNPREPARED"]))
    }
}

fn tag_overscan(ad: &AstroData) -> Option<TagSet> {
    let mut tags = Vec::new();
    for keyword in ad.phu_keywords() {
        if keyword.contains("TRIMOVER") && !tags.contains(&"OVERSCAN_TRIMMED") {
            tags.push("OVERSCAN_TRIMMED");
        }
        if keyword.contains("SUBOVER") && !tags.contains(&"OVERSCAN_SUBTRACTED") {
            tags.push("OVERSCAN_SUBTRACTED");
        }
    }
    (!tags.is_empty()).then(|| TagSet::new(&tags))
}

fn tag_processed_calibration(ad: &AstroData) -> Option<TagSet> {
    let processed = [
        "PROCARC", "GBIAS", "PROCBIAS", "PROCDARK", "GIFLAG", "PROCFLAT", "GIFRINGE", "PROCFRNG",
    ]
    .iter()
    .any(|keyword| ad.phu_contains(keyword));
    processed.then(|| TagSet::new(&["PROCESSED"]))
}

fn tag_processed_science(ad: &AstroData) -> Option<TagSet> {
    let mosaicked = ad.phu_keywords().any(|keyword| keyword.contains("GMOSAIC"));
    let prepared = ad.phu_keywords().any(|keyword| keyword.contains("PREPAR"));
    (mosaicked && prepared && ad.phu_str("OBSTYPE") == Some("OBJECT"))
        .then(|| TagSet::new(&["PROCESSED_SCIENCE"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::testing::*;

    fn gemini(cards: &[(&str, V)]) -> AstroData {
        let mut phu = vec![
            ("INSTRUME", V::S("NIRI")),
            ("OBSERVAT", V::S("Gemini-North")),
        ];
        phu.extend(cards.iter().map(|(name, value)| (*name, value.clone())));
        ad(&phu, &[])
    }

    #[test]
    fn filter_names_are_tidied() {
        assert_eq!(pretty_filter_name("g_G0301", "open2-8"), "g");
        assert_eq!(pretty_filter_name("open1-6", "open2-8"), "open");
        assert_eq!(pretty_filter_name("r_G0303", "CaT_G0309"), "r&CaT");
        assert_eq!(pretty_filter_name("DK_G0807", "open"), "DK&dark");
        assert_eq!(pretty_filter_name("ND2.0_G0311", "Clear_G0000"), "open");
    }

    #[test]
    fn raw_filter_name_joins_both_wheels() {
        let ad = gemini(&[("FILTER1", V::S("J_G0802")), ("FILTER2", V::S("open"))]);
        assert_eq!(show(&ad, "filter_name"), "J_G0802&open");

        let ad = gemini(&[("FILTER1", V::S("J_G0802"))]);
        assert_eq!(show(&ad, "filter_name"), "None");
    }

    #[test]
    fn bounded_values() {
        let ad = gemini(&[("AIRMASS", V::F(1.25)), ("CRPA", V::F(-400.0))]);
        assert_eq!(show(&ad, "airmass"), "1.25");
        assert_eq!(show(&ad, "cass_rotator_pa"), "None");

        let ad = gemini(&[("AIRMASS", V::F(0.5)), ("CRPA", V::F(90.5))]);
        assert_eq!(show(&ad, "airmass"), "None");
        assert_eq!(show(&ad, "cass_rotator_pa"), "90.5");
    }

    #[test]
    fn exposure_time_is_summed_over_coadds_until_prepared() {
        let ad = gemini(&[("EXPTIME", V::F(10.0)), ("COADDS", V::I(3))]);
        assert_eq!(show(&ad, "exposure_time"), "30.0");
        assert_eq!(show(&ad, "coadds"), "3");

        let ad = gemini(&[("EXPTIME", V::I(10)), ("PREPARE", V::S("done"))]);
        assert_eq!(show(&ad, "exposure_time"), "10");

        let ad = gemini(&[("EXPTIME", V::F(-1.0))]);
        assert_eq!(show(&ad, "exposure_time"), "None");
    }

    #[test]
    fn central_wavelength_is_in_meters() {
        let ad = gemini(&[("CWAVE", V::F(2.2))]);
        let value = ad.descriptor("central_wavelength").unwrap().as_f64().unwrap();
        assert!((value - 2.2e-6).abs() < 1e-15);

        assert_eq!(show(&gemini(&[]), "central_wavelength"), "None");
    }

    #[test]
    fn sections_are_listed_per_extension() {
        let ad = ad(
            &[("OBSERVAT", V::S("Gemini-South"))],
            &[
                &[("DATASEC", V::S("[1:2048,1:4608]"))],
                &[("EXTNAME", V::S("SCI"))],
            ],
        );
        assert_eq!(show(&ad, "data_section"), "[(0, 2048, 0, 4608), None]");

        let ad = ad_with_bad_section();
        assert!(matches!(
            ad.descriptor("data_section"),
            Err(DescriptorError::Evaluation { .. })
        ));
    }

    fn ad_with_bad_section() -> AstroData {
        ad(
            &[("OBSERVAT", V::S("Gemini-South"))],
            &[&[("DATASEC", V::S("everything"))]],
        )
    }

    #[test]
    fn qa_state_combines_the_two_assessments() {
        let qa = |pi: &'static str, gemini_qa: &'static str| {
            show(
                &gemini(&[("RAWPIREQ", V::S(pi)), ("RAWGEMQA", V::S(gemini_qa))]),
                "qa_state",
            )
        };
        assert_eq!(qa("YES", "USABLE"), "Pass");
        assert_eq!(qa("NO", "USABLE"), "Usable");
        assert_eq!(qa("YES", "BAD"), "Fail");
        assert_eq!(qa("UNKNOWN", "USABLE"), "Undefined");
        assert_eq!(qa("CHECK", "USABLE"), "CHECK");
        assert_eq!(qa("YES", "CHECK"), "CHECK");
        assert_eq!(qa("MAYBE", "SOSO"), "MAYBE:SOSO");

        assert_eq!(
            gemini(&[("RAWPIREQ", V::S("YES"))]).descriptor("qa_state"),
            Err(DescriptorError::missing("qa_state", "RAWGEMQA"))
        );
    }

    #[test]
    fn sky_conditions_are_percentiles() {
        let ad = gemini(&[("RAWIQ", V::S("70-percentile")), ("REQCC", V::S("Any"))]);
        assert_eq!(show(&ad, "raw_iq"), "70");
        assert_eq!(show(&ad, "requested_cc"), "100");
        assert_eq!(show(&ad, "raw_bg"), "None");
    }

    #[test]
    fn gcal_lamp_reports_off_behind_a_closed_shutter() {
        let lamp = |lamp: &'static str, shutter: &'static str| {
            show(
                &gemini(&[("GCALLAMP", V::S(lamp)), ("GCALSHUT", V::S(shutter))]),
                "gcal_lamp",
            )
        };
        assert_eq!(lamp("IRhigh", "CLOSED"), "Off");
        assert_eq!(lamp("IRhigh", "OPEN"), "IRhigh");
        assert_eq!(lamp("No Value", "OPEN"), "Off");
        assert_eq!(lamp("QH", "OPEN"), "QH");
        assert_eq!(show(&gemini(&[]), "gcal_lamp"), "None");
    }

    #[test]
    fn wavefront_sensors_are_sorted_and_joined() {
        let ad = gemini(&[
            ("PWFS2_ST", V::S("guiding")),
            ("OIWFS_ST", V::S("guiding")),
            ("PWFS1_ST", V::S("parked")),
        ]);
        assert_eq!(show(&ad, "wavefront_sensor"), "OIWFS&PWFS2");
        assert_eq!(show(&gemini(&[]), "wavefront_sensor"), "None");
    }

    #[test]
    fn ut_datetime_from_separate_date_and_time() {
        let ad = gemini(&[
            ("DATE-OBS", V::S("2017-01-01")),
            ("UT", V::S("10:20:30.5")),
        ]);
        assert_eq!(show(&ad, "ut_datetime"), "2017-01-01 10:20:30.500000");
        assert_eq!(show(&ad, "ut_date"), "2017-01-01");
        assert_eq!(show(&ad, "ut_time"), "10:20:30.500000");
    }

    #[test]
    fn ut_datetime_from_a_combined_value() {
        let ad = gemini(&[("DATE-OBS", V::S("2016-12-31T23:59:59"))]);
        assert_eq!(show(&ad, "ut_datetime"), "2016-12-31 23:59:59");
        assert_eq!(show(&ad, "ut_time"), "23:59:59");
    }

    #[test]
    fn ut_datetime_from_old_style_dates_and_mjd() {
        let ad = gemini(&[("DATE", V::S("31/12/98")), ("TIME-OBS", V::S("01:02:03"))]);
        assert_eq!(show(&ad, "ut_datetime"), "1998-12-31 01:02:03");

        let ad = gemini(&[("MJD_OBS", V::F(57754.5))]);
        assert_eq!(show(&ad, "ut_datetime"), "2017-01-01 12:00:00");
    }

    #[test]
    fn out_of_range_years_are_unreadable() {
        let ad = gemini(&[("DATE", V::S("01/01/2147483600"))]);
        assert!(matches!(
            ad.descriptor("ut_date"),
            Err(DescriptorError::Evaluation { .. })
        ));

        let ad = gemini(&[("MJD_OBS", V::F(1e12))]);
        assert_eq!(show(&ad, "ut_datetime"), "2017-01-01 00:00:00");
    }

    #[test]
    fn ut_datetime_falls_back_to_the_file_name() {
        let ad = gemini(&[]);
        assert_eq!(show(&ad, "ut_datetime"), "2017-01-01 00:00:00");
        assert_eq!(show(&ad, "ut_date"), "None");
        assert_eq!(show(&ad, "ut_time"), "None");
    }

    #[test]
    fn target_coordinates_without_proper_motion() {
        let ad = gemini(&[("RA", V::F(150.25)), ("DEC", V::F(-30.5))]);
        assert_eq!(show(&ad, "target_ra"), "150.25");
        assert_eq!(show(&ad, "target_dec"), "-30.5");
        assert_eq!(show(&gemini(&[]), "target_ra"), "None");
    }

    #[test]
    fn proper_motion_moves_the_target() {
        let ad = gemini(&[
            ("DEC", V::F(0.0)),
            ("PMDEC", V::F(3600.0)),
            ("EPOCH", V::F(2000.0)),
            ("DATE-OBS", V::S("2010-01-01T00:00:00")),
        ]);
        let dec = ad.descriptor("target_dec").unwrap().as_f64().unwrap();
        assert!((dec - 10.0).abs() < 0.01);
    }

    #[test]
    fn wcs_coordinates_of_the_image_centre() {
        let ad = ad(
            &[("OBSERVAT", V::S("Gemini-South"))],
            &[&[
                ("NAXIS1", V::I(200)),
                ("NAXIS2", V::I(400)),
                ("CTYPE1", V::S("RA---TAN")),
                ("CTYPE2", V::S("DEC--TAN")),
                ("CRPIX1", V::F(100.0)),
                ("CRPIX2", V::F(200.0)),
                ("CRVAL1", V::F(83.8)),
                ("CRVAL2", V::F(-5.4)),
                ("CD1_1", V::F(-4.0e-5)),
                ("CD1_2", V::F(0.0)),
                ("CD2_1", V::F(0.0)),
                ("CD2_2", V::F(4.0e-5)),
            ]],
        );
        let ra = ad.descriptor("ra").unwrap().as_f64().unwrap();
        let dec = ad.descriptor("dec").unwrap().as_f64().unwrap();
        assert!((ra - 83.8).abs() < 1e-9);
        assert!((dec + 5.4).abs() < 1e-9);

        let scale = ad.descriptor("pixel_scale").unwrap().as_f64().unwrap();
        assert!((scale - 0.144).abs() < 1e-9);
    }

    #[test]
    fn offsets_in_pixels_need_a_pixel_scale() {
        let ad = gemini(&[("POFFSET", V::F(1.0))]);
        assert_eq!(show(&ad, "detector_x_offset"), "None");
    }

    #[test]
    fn observing_state_tags() {
        let ad = gemini(&[
            ("OBSCLASS", V::S("acq")),
            ("FRAME", V::S("FK5")),
            ("RATRACK", V::F(0.0)),
            ("DECTRACK", V::S("0.0")),
            ("GCALLAMP", V::S("IRhigh")),
            ("GCALSHUT", V::S("CLOSED")),
        ]);
        for tag in [
            "GEMINI",
            "NORTH",
            "ACQUISITION",
            "SIDEREAL",
            "GCALFLAT",
            "FLAT",
            "CAL",
            "GCAL_IR_OFF",
            "LAMPOFF",
            "RAW",
            "UNPREPARED",
        ] {
            assert!(ad.has_tag(tag), "missing {}", tag);
        }
        assert!(!ad.has_tag("NON_SIDEREAL"));
    }

    #[test]
    fn processing_tags() {
        let ad = gemini(&[
            ("GEM-TLM", V::S("2017-01-02T00:00:00")),
            ("PREPARE", V::S("2017-01-02T00:00:00")),
            ("TRIMOVER", V::S("2017-01-02T00:00:00")),
            ("PROCFLAT", V::S("2017-01-02T00:00:00")),
            ("GCALLAMP", V::S("IRhigh")),
            ("GCALSHUT", V::S("OPEN")),
        ]);
        for tag in ["PREPARED", "OVERSCAN_TRIMMED", "PROCESSED", "FLAT"] {
            assert!(ad.has_tag(tag), "missing {}", tag);
        }
        for tag in ["RAW", "UNPREPARED", "GCAL_IR_ON", "OVERSCAN_SUBTRACTED"] {
            assert!(!ad.has_tag(tag), "unexpected {}", tag);
        }
    }
}
