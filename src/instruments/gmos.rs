//! The Gemini Multi-Object Spectrographs, GMOS-N and GMOS-S.
use super::{
    common::remove_component_id,
    convert_units,
    gemini::{inport_is_one, offset_in_pixels, pretty_filter_name},
    Accessor, DescriptorResult, TagRule, Unit,
};
use crate::{
    astrodata::{AstroData, DescriptorError, DescriptorValue, TagSet},
    types::Value,
};
use regex::Regex;
use std::sync::LazyLock;

pub(super) static KEYWORDS: &[(&str, &str)] = &[
    ("array_name", "AMPNAME"),
    ("array_section", "CCDSEC"),
    ("camera", "INSTRUME"),
    ("overscan_section", "BIASSEC"),
    ("wavelength_reference_pixel", "CRPIX1"),
];

pub(super) static DESCRIPTORS: &[(&str, Accessor)] = &[
    ("amp_read_area", amp_read_area),
    ("central_wavelength", central_wavelength),
    ("detector_name", detector_name),
    ("detector_rois_requested", detector_rois_requested),
    ("detector_x_bin", detector_x_bin),
    ("detector_x_offset", detector_x_offset),
    ("detector_y_bin", detector_y_bin),
    ("detector_y_offset", detector_y_offset),
    ("disperser", disperser),
    ("dispersion", dispersion),
    ("dispersion_axis", dispersion_axis),
    ("exposure_time", exposure_time),
    ("focal_plane_mask", focal_plane_mask),
    ("gain_setting", gain_setting),
    ("group_id", group_id),
    ("nod_count", nod_count),
    ("nod_offsets", nod_offsets),
    ("nod_pixels", nod_pixels),
    ("read_speed_setting", read_speed_setting),
    ("wcs_dec", wcs_dec),
    ("wcs_ra", wcs_ra),
];

pub(super) static TAG_RULES: &[(&str, TagRule)] = &[
    ("arc", tag_arc),
    ("bias", tag_bias),
    ("dark", tag_dark),
    ("flat", tag_flat),
    ("ifu", tag_ifu),
    ("image", tag_image),
    ("instrument", tag_instrument),
    ("long_slit", tag_long_slit),
    ("mask", tag_mask),
    ("multi_object", tag_multi_object),
    ("nod_and_shuffle", tag_nod_and_shuffle),
    ("twilight", tag_twilight),
];

static IFU_MDF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^g[ns]ifu_slit([rbs])_mdf").expect("Failed to compile IFU mask regex")
});

// Above this many microseconds of integration a read is slow.
const HAMAMATSU_SLOW_READ: f64 = 8000.0;
const EEV_SLOW_READ: f64 = 2000.0;

// Exposures longer than this are header errors.
const MAX_EXPOSURE: f64 = 10000.0;

/// The short name of the detector array, from `DETTYPE`.
fn pretty_detector_name(ad: &AstroData) -> Option<&'static str> {
    match ad.phu_str("DETTYPE")? {
        "SDSU II CCD" => Some("EEV"),
        "SDSU II e2v DD CCD42-90" => Some("e2vDD"),
        "S10892" => Some("Hamamatsu-S"),
        "S10892-N" => Some("Hamamatsu-N"),
        _ => None,
    }
}

/// The grating without its component ID or trailing `+`.
fn pretty_disperser(ad: &AstroData) -> DescriptorValue {
    ad.phu_str("GRATING")
        .map(|grating| remove_component_id(grating).trim_matches('+'))
        .into()
}

fn pretty_filter(ad: &AstroData) -> DescriptorValue {
    ad.phu_str("FILTER1")
        .zip(ad.phu_str("FILTER2"))
        .map(|(f1, f2)| pretty_filter_name(f1, f2))
        .into()
}

// The single value shared by every extension, if they agree.
fn uniform(values: Vec<DescriptorValue>) -> DescriptorValue {
    match values.split_first() {
        Some((first, rest)) if rest.iter().all(|v| v == first) => first.clone(),
        _ => DescriptorValue::None,
    }
}

fn is_spect(ad: &AstroData) -> bool {
    !(ad.phu_f64("MASKTYP") == Some(0.0)
        || ad.phu_str("MASKNAME") == Some("None")
        || ad.phu_str("GRATING") == Some("MIRROR"))
}

fn amp_read_area(ad: &AstroData) -> DescriptorResult {
    let amps = ad.hdr_str(ad.keyword_for("array_name")?);
    let sections = ad.hdr_str(ad.keyword_for("detector_section")?);
    let areas: Vec<Option<String>> = amps
        .into_iter()
        .zip(sections)
        .map(|(amp, section)| match (amp, section) {
            (Some(amp), Some(section)) if !amp.is_empty() && !section.is_empty() => {
                Some(format!("'{}':{}", amp, section))
            }
            _ => None,
        })
        .collect();
    Ok(areas.into())
}

fn central_wavelength(ad: &AstroData) -> DescriptorResult {
    // CENTWAVE only exists from 2007 onwards
    let nanometers = ad
        .phu_f64("CENTWAVE")
        .or_else(|| ad.phu_f64("GRWLEN"))
        .unwrap_or(-1.0);
    if nanometers < 0.0 {
        return Ok(DescriptorValue::None);
    }
    Ok(convert_units(Unit::Nanometers, nanometers, Unit::Meters).into())
}

fn detector_name(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value("DETID"))
}

fn detector_rois_requested(ad: &AstroData) -> DescriptorResult {
    let mut rois = Vec::new();
    for roi in 1..10 {
        let corner = |axis: &str| {
            ad.phu_f64(&format!("DETRO{}{}", roi, axis))
                .filter(|v| *v != 0.0)
                .map(|v| v as i64)
        };
        let (Some(x1), Some(xs), Some(y1), Some(ys)) =
            (corner("X"), corner("XS"), corner("Y"), corner("YS"))
        else {
            break;
        };
        let bin = |descriptor: &'static str| -> Result<i64, DescriptorError> {
            ad.descriptor(descriptor)?.as_i64().ok_or_else(|| {
                DescriptorError::evaluation(
                    "detector_rois_requested",
                    "the extensions do not share one binning",
                )
            })
        };
        let xs = xs * bin("detector_x_bin")?;
        let ys = ys * bin("detector_y_bin")?;
        rois.push(DescriptorValue::Tuple(vec![
            x1.into(),
            (x1 + xs - 1).into(),
            y1.into(),
            (y1 + ys - 1).into(),
        ]));
    }
    Ok(DescriptorValue::List(rois))
}

// `CCDSUM` is "xbin ybin"
fn binning(ad: &AstroData, axis: usize) -> DescriptorValue {
    let bins: Vec<DescriptorValue> = ad
        .hdr_str("CCDSUM")
        .into_iter()
        .map(|ccdsum| {
            let bin = ccdsum
                .and_then(|s| s.split_whitespace().nth(axis))
                .and_then(|bin| bin.parse::<i64>().ok());
            DescriptorValue::from(bin)
        })
        .collect();
    uniform(bins)
}

fn detector_x_bin(ad: &AstroData) -> DescriptorResult {
    Ok(binning(ad, 0))
}

fn detector_y_bin(ad: &AstroData) -> DescriptorResult {
    Ok(binning(ad, 1))
}

// The bottom port flips one axis, which one depends on the site.
fn flipped(ad: &AstroData, instrument: &str) -> Result<bool, DescriptorError> {
    Ok(inport_is_one(ad) && ad.descriptor("instrument")?.as_str() == Some(instrument))
}

fn detector_x_offset(ad: &AstroData) -> DescriptorResult {
    let offset = offset_in_pixels(ad, "POFFSET")?;
    let flip = if flipped(ad, "GMOS-N")? { -1.0 } else { 1.0 };
    Ok(offset.map(|x| flip * x).into())
}

fn detector_y_offset(ad: &AstroData) -> DescriptorResult {
    let offset = offset_in_pixels(ad, "QOFFSET")?;
    let flip = if flipped(ad, "GMOS-S")? { -1.0 } else { 1.0 };
    Ok(offset.map(|y| flip * y).into())
}

fn disperser(ad: &AstroData) -> DescriptorResult {
    Ok(ad.phu_value("GRATING"))
}

fn dispersion(ad: &AstroData) -> DescriptorResult {
    Ok(ad.hdr_f64("CD1_1").into())
}

fn dispersion_axis(ad: &AstroData) -> DescriptorResult {
    let axis = if ad.has_tag("SPECT") {
        DescriptorValue::Int(1)
    } else {
        DescriptorValue::None
    };
    Ok(DescriptorValue::List(vec![axis; ad.hdr_headers().len()]))
}

fn exposure_time(ad: &AstroData) -> DescriptorResult {
    let exposure = ad.phu_get(ad.keyword_for("exposure_time")?);
    Ok(exposure
        .filter(|v| {
            v.as_f64()
                .is_some_and(|t| (0.0..=MAX_EXPOSURE).contains(&t))
        })
        .into())
}

fn focal_plane_mask(ad: &AstroData) -> DescriptorResult {
    Ok(match ad.phu_str("MASKNAME") {
        Some("None") => "Imaging".into(),
        _ => ad.phu_value("MASKNAME"),
    })
}

fn gain_setting(ad: &AstroData) -> DescriptorResult {
    fn setting(gain: Option<f64>) -> DescriptorValue {
        gain.map(|g| if g < 3.0 { "low" } else { "high" }).into()
    }
    let all_present = |values: &[Option<f64>]| values.iter().all(Option::is_some);

    let settings: Vec<DescriptorValue> = if !ad.has_tag("PREPARED") {
        // the GAIN keywords of raw data are only good enough for this
        ad.hdr_f64("GAIN").into_iter().map(setting).collect()
    } else {
        let keyword = ad.keyword_for("gain_setting")?;
        let recorded = ad.hdr_get(keyword);
        if recorded.iter().all(Option::is_some) {
            recorded.into_iter().map(DescriptorValue::from).collect()
        } else {
            let mut gains = ad.hdr_f64("GAINORIG");
            if all_present(&gains) {
                if gains.iter().all(|g| *g == Some(1.0)) {
                    gains = ad.hdr_f64("GAINMULT");
                }
            } else {
                gains = ad.hdr_f64(ad.keyword_for("gain")?);
            }
            gains.into_iter().map(setting).collect()
        }
    };
    Ok(uniform(settings))
}

fn group_id(ad: &AstroData) -> DescriptorResult {
    let mut parts = if ad.has_tag("BIAS") {
        vec![]
    } else if ad.has_tag("DARK") {
        vec![ad.descriptor("exposure_time")?]
    } else if ad.has_tag("IMAGE") && (ad.has_tag("FLAT") || ad.has_tag("TWILIGHT")) {
        vec![pretty_filter(ad)]
    } else {
        vec![ad.descriptor("observation_id")?, pretty_filter(ad)]
    };
    parts.push(ad.descriptor("detector_x_bin")?);
    parts.push(ad.descriptor("detector_y_bin")?);
    parts.push(ad.descriptor("read_mode")?);
    let amp_read_area = match ad.descriptor("amp_read_area")? {
        list @ DescriptorValue::List(_) => list,
        single => DescriptorValue::List(vec![single]),
    };
    parts.push(amp_read_area);
    if ad.has_tag("SPECT") {
        parts.push(pretty_disperser(ad));
    }

    let parts: Vec<String> = parts.iter().map(ToString::to_string).collect();
    Ok(parts.join("_").into())
}

fn nod_count(ad: &AstroData) -> DescriptorResult {
    let count = |keyword: &str| ad.phu_f64(keyword).map(|n| DescriptorValue::Int(n as i64));
    Ok(match (count("ANODCNT"), count("BNODCNT")) {
        (Some(a), Some(b)) => DescriptorValue::Tuple(vec![a, b]),
        _ => DescriptorValue::None,
    })
}

fn nod_offsets(ad: &AstroData) -> DescriptorResult {
    let offsets = match (ad.phu_get("NODAYOFF"), ad.phu_get("NODBYOFF")) {
        (Some(a), Some(b)) => vec![a.into(), b.into()],
        _ => match ad.phu_get("NODYOFF") {
            Some(b) => vec![DescriptorValue::Float(0.0), b.into()],
            None => return Ok(DescriptorValue::None),
        },
    };
    Ok(DescriptorValue::Tuple(offsets))
}

fn nod_pixels(ad: &AstroData) -> DescriptorResult {
    if !ad.has_tag("NODANDSHUFFLE") {
        return Ok(DescriptorValue::None);
    }
    Ok(ad.phu_value("NODPIX"))
}

fn read_speed_setting(ad: &AstroData) -> DescriptorResult {
    let Some(integration) = ad.phu_f64("AMPINTEG") else {
        return Ok(DescriptorValue::None);
    };
    let detector = pretty_detector_name(ad).ok_or_else(|| {
        DescriptorError::evaluation("read_speed_setting", "the detector type is not known")
    })?;
    let threshold = if detector.starts_with("Hamamatsu") {
        HAMAMATSU_SLOW_READ
    } else {
        EEV_SLOW_READ
    };
    Ok(if integration > threshold { "slow" } else { "fast" }.into())
}

// CRVALn of the first extension, or of the primary header.
fn reference_value(ad: &AstroData, axis: u8, ctype: &str) -> DescriptorValue {
    let crval = format!("CRVAL{}", axis);
    let ctype_keyword = format!("CTYPE{}", axis);
    let header = ad
        .extensions()
        .first()
        .filter(|h| h.contains(&crval) && h.contains(&ctype_keyword))
        .unwrap_or_else(|| ad.phu());
    match header.get(&ctype_keyword).and_then(Value::as_str) {
        Some(found) if found == ctype => header.get(&crval).into(),
        _ => DescriptorValue::None,
    }
}

fn wcs_ra(ad: &AstroData) -> DescriptorResult {
    Ok(reference_value(ad, 1, "RA---TAN"))
}

fn wcs_dec(ad: &AstroData) -> DescriptorResult {
    Ok(reference_value(ad, 2, "DEC--TAN"))
}

fn obstype(ad: &AstroData) -> Option<&str> {
    ad.phu_str("OBSTYPE")
}

fn tag_instrument(_: &AstroData) -> Option<TagSet> {
    Some(TagSet::new(&["GMOS"]))
}

fn tag_dark(ad: &AstroData) -> Option<TagSet> {
    (obstype(ad)? == "DARK").then(|| TagSet::new(&["DARK"]).blocks(&["IMAGE", "SPECT"]))
}

fn tag_arc(ad: &AstroData) -> Option<TagSet> {
    (obstype(ad)? == "ARC").then(|| TagSet::new(&["ARC", "CAL"]))
}

fn tag_bias(ad: &AstroData) -> Option<TagSet> {
    (obstype(ad)? == "BIAS").then(|| TagSet::new(&["BIAS", "CAL"]).blocks(&["IMAGE", "SPECT"]))
}

fn tag_flat(ad: &AstroData) -> Option<TagSet> {
    if obstype(ad)? != "FLAT" {
        return None;
    }
    // Hartmann masks in the filter wheels make an imaging flat something else
    let hartmann = ["FILTER1", "FILTER2"]
        .iter()
        .any(|keyword| ad.phu_str(keyword).is_some_and(|f| f.contains("Hartmann")));
    if ad.phu_str("GRATING") == Some("MIRROR") && hartmann {
        return None;
    }
    Some(TagSet::new(&["GCALFLAT", "FLAT", "CAL"]))
}

fn tag_twilight(ad: &AstroData) -> Option<TagSet> {
    // twilight flats have OBSTYPE OBJECT, so FLAT is added here too
    (ad.phu_str("OBJECT")?.to_uppercase() == "TWILIGHT")
        .then(|| TagSet::new(&["TWILIGHT", "CAL", "FLAT"]))
}

fn tag_ifu(ad: &AstroData) -> Option<TagSet> {
    if !is_spect(ad) || ad.phu_f64("MASKTYP") != Some(-1.0) {
        return None;
    }
    let slits = match ad.phu_str("MASKNAME")? {
        "IFU-B" | "IFU-B-NS" => "ONESLIT_BLUE",
        "IFU-R" | "IFU-R-NS" => "ONESLIT_RED",
        "IFU-2" | "IFU-NS-2" => "TWOSLIT",
        name => match &IFU_MDF.captures(name)?[1] {
            "b" => "ONESLIT_BLUE",
            "r" => "ONESLIT_RED",
            _ => "TWOSLIT",
        },
    };
    Some(TagSet::new(&["SPECT", "IFU", slits]))
}

fn tag_mask(ad: &AstroData) -> Option<TagSet> {
    (ad.phu_str("GRATING")? == "MIRROR" && ad.phu_f64("MASKTYP") != Some(0.0))
        .then(|| TagSet::new(&["MASK"]))
}

fn tag_image(ad: &AstroData) -> Option<TagSet> {
    (ad.phu_str("GRATING")? == "MIRROR").then(|| TagSet::new(&["IMAGE"]))
}

fn tag_long_slit(ad: &AstroData) -> Option<TagSet> {
    let mask = ad.phu_str("MASKNAME").unwrap_or("");
    (is_spect(ad) && ad.phu_f64("MASKTYP") == Some(1.0) && mask.ends_with("arcsec"))
        .then(|| TagSet::new(&["SPECT", "LS"]))
}

fn tag_multi_object(ad: &AstroData) -> Option<TagSet> {
    let mask = ad.phu_str("MASKNAME").unwrap_or("");
    let other_mask =
        mask.starts_with("IFU") || mask.starts_with("focus") || mask.ends_with("arcsec");
    (is_spect(ad) && ad.phu_f64("MASKTYP") == Some(1.0) && !other_mask)
        .then(|| TagSet::new(&["SPECT", "MOS"]))
}

fn tag_nod_and_shuffle(ad: &AstroData) -> Option<TagSet> {
    ad.phu_contains("NODPIX").then(|| TagSet::new(&["NODANDSHUFFLE"]))
}

#[cfg(test)]
mod tests {
    use crate::instruments::testing::*;

    const IMAGING: &[(&str, V)] = &[
        ("INSTRUME", V::S("GMOS-N")),
        ("OBSERVAT", V::S("Gemini-North")),
        ("OBSTYPE", V::S("OBJECT")),
        ("OBSID", V::S("GN-2017A-Q-1-2")),
        ("GRATING", V::S("MIRROR")),
        ("MASKTYP", V::I(0)),
        ("MASKNAME", V::S("None")),
        ("FILTER1", V::S("g_G0301")),
        ("FILTER2", V::S("open2-8")),
        ("DETTYPE", V::S("S10892-N")),
        ("AMPINTEG", V::I(5000)),
        ("EXPTIME", V::F(300.0)),
    ];

    fn amp(name: &'static str, detsec: &'static str) -> Vec<(&'static str, V)> {
        vec![
            ("AMPNAME", V::S(name)),
            ("DETSEC", V::S(detsec)),
            ("CCDSUM", V::S("2 2")),
            ("CD1_1", V::F(1.0e-10)),
        ]
    }

    fn imaging(extra: &[(&'static str, V)]) -> crate::astrodata::AstroData {
        let mut phu = IMAGING.to_vec();
        for (name, value) in extra {
            match phu.iter_mut().find(|(existing, _)| existing == name) {
                Some(card) => card.1 = value.clone(),
                None => phu.push((*name, value.clone())),
            }
        }
        let a = amp("amp1", "[1:512,1:4224]");
        let b = amp("amp2", "[513:1024,1:4224]");
        ad(&phu, &[&a[..], &b[..]])
    }

    #[test]
    fn camera_and_raw_filter_of_an_image() {
        let ad = ad(
            &[
                ("INSTRUME", V::S("GMOS-N")),
                ("OBSERVAT", V::S("Gemini-North")),
                ("FILTER1", V::S("g_G0301")),
                ("FILTER2", V::S("open2-8")),
            ],
            &[],
        );
        assert_eq!(show(&ad, "camera"), "GMOS-N");
        assert_eq!(show(&ad, "filter_name"), "g_G0301&open2-8");
    }

    #[test]
    fn imaging_tags() {
        let ad = imaging(&[]);
        for tag in ["GEMINI", "GMOS", "NORTH", "IMAGE", "RAW", "UNPREPARED"] {
            assert!(ad.has_tag(tag), "missing {}", tag);
        }
        for tag in ["SPECT", "MASK", "LS", "MOS", "FLAT"] {
            assert!(!ad.has_tag(tag), "unexpected {}", tag);
        }
    }

    #[test]
    fn bias_blocks_image() {
        let ad = imaging(&[("OBSTYPE", V::S("BIAS"))]);
        assert!(ad.has_tag("BIAS"));
        assert!(ad.has_tag("CAL"));
        assert!(!ad.has_tag("IMAGE"));
    }

    #[test]
    fn spectroscopy_tags() {
        let spectrum = |masktyp: i64, maskname: &'static str| {
            ad(
                &[
                    ("INSTRUME", V::S("GMOS-S")),
                    ("GRATING", V::S("B600+_G5307")),
                    ("MASKTYP", V::I(masktyp)),
                    ("MASKNAME", V::S(maskname)),
                ],
                &[],
            )
        };
        let ls = spectrum(1, "1.0arcsec");
        assert!(ls.has_tag("LS") && ls.has_tag("SPECT") && !ls.has_tag("MOS"));

        let mos = spectrum(1, "GS2017AQ001-01");
        assert!(mos.has_tag("MOS") && !mos.has_tag("LS"));

        let ifu = spectrum(-1, "IFU-R");
        assert!(ifu.has_tag("IFU") && ifu.has_tag("ONESLIT_RED"));

        let ifu = spectrum(-1, "gsifu_slits_mdf");
        assert!(ifu.has_tag("TWOSLIT"));
    }

    #[test]
    fn hartmann_flats_are_not_flats() {
        let ad = imaging(&[
            ("OBSTYPE", V::S("FLAT")),
            ("FILTER2", V::S("Hartmann_A_G0337")),
        ]);
        assert!(!ad.has_tag("FLAT"));

        let ad = imaging(&[("OBSTYPE", V::S("FLAT"))]);
        assert!(ad.has_tag("GCALFLAT"));
    }

    #[test]
    fn per_amplifier_descriptors() {
        let ad = imaging(&[]);
        assert_eq!(show(&ad, "array_name"), "['amp1', 'amp2']");
        assert_eq!(
            show(&ad, "amp_read_area"),
            "[\"'amp1':[1:512,1:4224]\", \"'amp2':[513:1024,1:4224]\"]"
        );
        assert_eq!(show(&ad, "detector_x_bin"), "2");
        assert_eq!(show(&ad, "detector_y_bin"), "2");
        assert_eq!(show(&ad, "dispersion_axis"), "[None, None]");
        assert_eq!(show(&ad, "dispersion"), "[1e-10, 1e-10]");
    }

    #[test]
    fn mixed_binning_has_no_single_value() {
        let a = vec![("CCDSUM", V::S("1 1"))];
        let b = vec![("CCDSUM", V::S("2 2"))];
        let ad = ad(&[("INSTRUME", V::S("GMOS-S"))], &[&a[..], &b[..]]);
        assert_eq!(show(&ad, "detector_x_bin"), "None");
    }

    #[test]
    fn settings_from_the_detector() {
        let ad = imaging(&[]);
        assert_eq!(show(&ad, "read_speed_setting"), "fast");
        assert_eq!(show(&ad, "exposure_time"), "300.0");
        assert_eq!(show(&ad, "focal_plane_mask"), "Imaging");
        assert_eq!(show(&ad, "gain_setting"), "None");

        let ad = imaging(&[("DETTYPE", V::S("SDSU II CCD"))]);
        assert_eq!(show(&ad, "read_speed_setting"), "slow");

        let ad = imaging(&[("DETTYPE", V::S("CCD of the future"))]);
        assert!(ad.descriptor("read_speed_setting").is_err());
    }

    #[test]
    fn group_id_combines_the_setup() {
        let ad = imaging(&[]);
        assert_eq!(
            show(&ad, "group_id"),
            "GN-2017A-Q-1-2_g_2_2_None_[\"'amp1':[1:512,1:4224]\", \"'amp2':[513:1024,1:4224]\"]"
        );
    }

    #[test]
    fn regions_of_interest_are_scaled_by_binning() {
        let ad = imaging(&[
            ("DETRO1X", V::I(1)),
            ("DETRO1XS", V::I(512)),
            ("DETRO1Y", V::I(1)),
            ("DETRO1YS", V::I(1024)),
        ]);
        assert_eq!(show(&ad, "detector_rois_requested"), "[(1, 1024, 1, 2048)]");
    }

    #[test]
    fn central_wavelength_is_in_nanometers() {
        let ad = imaging(&[("CENTWAVE", V::F(520.0))]);
        let value = ad.descriptor("central_wavelength").unwrap().as_f64().unwrap();
        assert!((value - 5.2e-7).abs() < 1e-15);
    }

    #[test]
    fn nod_and_shuffle() {
        let ad = imaging(&[
            ("NODPIX", V::I(1536)),
            ("ANODCNT", V::I(10)),
            ("BNODCNT", V::I(10)),
            ("NODYOFF", V::F(-1.5)),
        ]);
        assert!(ad.has_tag("NODANDSHUFFLE"));
        assert_eq!(show(&ad, "nod_pixels"), "1536");
        assert_eq!(show(&ad, "nod_count"), "(10, 10)");
        assert_eq!(show(&ad, "nod_offsets"), "(0.0, -1.5)");
    }

    #[test]
    fn wcs_uses_the_reference_value() {
        let ext = vec![
            ("CTYPE1", V::S("RA---TAN")),
            ("CRVAL1", V::F(10.5)),
            ("CTYPE2", V::S("DEC--TAN")),
            ("CRVAL2", V::F(-3.25)),
        ];
        let ad = ad(&[("INSTRUME", V::S("GMOS-S"))], &[&ext[..]]);
        assert_eq!(show(&ad, "ra"), "10.5");
        assert_eq!(show(&ad, "wcs_dec"), "-3.25");
    }
}
