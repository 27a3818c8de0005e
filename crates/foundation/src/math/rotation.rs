use super::LonLat;

/// Rotation of the sphere expressed as three Euler angles in degrees:
/// a spin about the polar axis (`lambda`), then a tilt that moves the
/// equator (`phi`), then a roll about the view axis (`gamma`).
///
/// `SphereRotation::new(-lon, -lat, 0.0)` brings `(lon, lat)` to `(0, 0)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereRotation {
    pub lambda_deg: f64,
    pub phi_deg: f64,
    pub gamma_deg: f64,
}

impl Default for SphereRotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SphereRotation {
    pub const IDENTITY: Self = Self {
        lambda_deg: 0.0,
        phi_deg: 0.0,
        gamma_deg: 0.0,
    };

    pub const fn new(lambda_deg: f64, phi_deg: f64, gamma_deg: f64) -> Self {
        Self {
            lambda_deg,
            phi_deg,
            gamma_deg,
        }
    }

    /// Rotation that moves `center` to the origin of the projection.
    pub fn centering(center: LonLat) -> Self {
        Self::new(-center.lon_deg, -center.lat_deg, 0.0)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, p: LonLat) -> LonLat {
        let lon = wrap_once(p.lon_deg + self.lambda_deg);
        if self.phi_deg == 0.0 && self.gamma_deg == 0.0 {
            return LonLat::new(lon, p.lat_deg);
        }
        let (sin_dp, cos_dp) = self.phi_deg.to_radians().sin_cos();
        let (sin_dg, cos_dg) = self.gamma_deg.to_radians().sin_cos();

        let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
        let (sin_lat, cos_lat) = p.lat_deg.to_radians().sin_cos();
        let x = cos_lon * cos_lat;
        let y = sin_lon * cos_lat;
        let z = sin_lat;
        let k = z * cos_dp + x * sin_dp;

        LonLat::new(
            (y * cos_dg - k * sin_dg)
                .atan2(x * cos_dp - z * sin_dp)
                .to_degrees(),
            (k * cos_dg + y * sin_dg).clamp(-1.0, 1.0).asin().to_degrees(),
        )
    }

    pub fn invert(&self, p: LonLat) -> LonLat {
        let mut lon = p.lon_deg;
        let mut lat = p.lat_deg;
        if self.phi_deg != 0.0 || self.gamma_deg != 0.0 {
            let (sin_dp, cos_dp) = self.phi_deg.to_radians().sin_cos();
            let (sin_dg, cos_dg) = self.gamma_deg.to_radians().sin_cos();

            let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
            let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
            let x = cos_lon * cos_lat;
            let y = sin_lon * cos_lat;
            let z = sin_lat;
            let k = z * cos_dg - y * sin_dg;

            lon = (y * cos_dg + z * sin_dg)
                .atan2(x * cos_dp + k * sin_dp)
                .to_degrees();
            lat = (k * cos_dp - x * sin_dp).clamp(-1.0, 1.0).asin().to_degrees();
        }
        LonLat::new(wrap_once(lon - self.lambda_deg), lat)
    }
}

/// Brings a longitude offset by at most one turn back into `[-180, 180]`.
/// Unlike a full wrap this keeps `180` as `180`, so unrotated edges of the
/// world stay on their own side.
fn wrap_once(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}
