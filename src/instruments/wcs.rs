//! Celestial coordinates from the world coordinate system of a header.
//!
//! Only the gnomonic (`TAN`) projection is understood. The linear part comes
//! from the `CDi_j` matrix when the header has one, from `CDELTi` otherwise.
use crate::types::Header;

/// The sky world coordinate system of one header.
#[derive(Debug, Clone, PartialEq)]
pub struct Wcs {
    crpix: [f64; 2],
    crval: [f64; 2],
    cd: [[f64; 2]; 2],
}

impl Wcs {
    /// The WCS of `header`, if its axes are RA and DEC in a `TAN` projection.
    pub fn from_header(header: &Header<'_>) -> Option<Wcs> {
        let ctype1 = header.get("CTYPE1")?.as_str()?;
        let ctype2 = header.get("CTYPE2")?.as_str()?;
        if !(ctype1.starts_with("RA") && ctype2.starts_with("DEC")) {
            return None;
        }
        if projection(ctype1) != Some("TAN") || projection(ctype2) != Some("TAN") {
            return None;
        }

        let number = |name: &str, default: f64| {
            header
                .get(name)
                .and_then(|v| v.as_f64())
                .unwrap_or(default)
        };
        let has_cd = ["CD1_1", "CD1_2", "CD2_1", "CD2_2"]
            .iter()
            .any(|name| header.get(name).is_some());
        let cd = if has_cd {
            [
                [number("CD1_1", 0.0), number("CD1_2", 0.0)],
                [number("CD2_1", 0.0), number("CD2_2", 0.0)],
            ]
        } else {
            [[number("CDELT1", 1.0), 0.0], [0.0, number("CDELT2", 1.0)]]
        };

        Some(Wcs {
            crpix: [number("CRPIX1", 0.0), number("CRPIX2", 0.0)],
            crval: [number("CRVAL1", 0.0), number("CRVAL2", 0.0)],
            cd,
        })
    }

    /// Right ascension and declination, in degrees, of the 1-based pixel `(x, y)`.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.crpix[0];
        let dy = y - self.crpix[1];
        let xi = (self.cd[0][0] * dx + self.cd[0][1] * dy).to_radians();
        let eta = (self.cd[1][0] * dx + self.cd[1][1] * dy).to_radians();

        let ra0 = self.crval[0].to_radians();
        let dec0 = self.crval[1].to_radians();
        let denominator = dec0.cos() - eta * dec0.sin();
        let ra = ra0 + xi.atan2(denominator);
        let dec = (dec0.sin() + eta * dec0.cos()).atan2(xi.hypot(denominator));

        (ra.to_degrees().rem_euclid(360.0), dec.to_degrees())
    }
}

// `RA---TAN` → `TAN`
fn projection(ctype: &str) -> Option<&str> {
    ctype.get(5..).map(str::trim)
}
