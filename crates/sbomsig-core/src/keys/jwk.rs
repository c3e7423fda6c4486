//! JWK export/import for public keys.
//!
//! Shapes:
//! - RSA: `{"kty":"RSA","n":..,"e":..}` (big-endian, leading zeros stripped)
//! - EC: `{"kty":"EC","crv":"P-256"|"P-384"|"P-521","x":..,"y":..}` (fixed width)
//! - Ed25519: `{"kty":"OKP","crv":"Ed25519","x":..}`
//!
//! All members are base64url without padding.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};

use crate::codec::{decode_b64url, encode_b64url};
use crate::errors::{SbomSigError, SbomSigResult};
use crate::keys::{EcCurve, PublicKeyMaterial};
use crate::model::Jwk;

const KTY_RSA: &str = "RSA";
const KTY_EC: &str = "EC";
const KTY_OKP: &str = "OKP";
const CRV_ED25519: &str = "Ed25519";

impl PublicKeyMaterial {
    pub fn to_jwk(&self) -> Jwk {
        match self {
            Self::Rsa(k) => Jwk {
                kty: KTY_RSA.to_string(),
                crv: None,
                n: Some(encode_b64url(&k.n().to_bytes_be())),
                e: Some(encode_b64url(&k.e().to_bytes_be())),
                x: None,
                y: None,
            },
            Self::P256(k) => ec_jwk(EcCurve::P256, k.to_encoded_point(false).as_bytes()),
            Self::P384(k) => ec_jwk(EcCurve::P384, k.to_encoded_point(false).as_bytes()),
            Self::P521(k) => ec_jwk(EcCurve::P521, k.to_encoded_point(false).as_bytes()),
            Self::Ed25519(k) => Jwk {
                kty: KTY_OKP.to_string(),
                crv: Some(CRV_ED25519.to_string()),
                n: None,
                e: None,
                x: Some(encode_b64url(k.as_bytes())),
                y: None,
            },
        }
    }

    pub fn from_jwk(jwk: &Jwk) -> SbomSigResult<Self> {
        match jwk.kty.as_str() {
            KTY_RSA => {
                let n = member(jwk.n.as_deref(), "n")?;
                let e = member(jwk.e.as_deref(), "e")?;
                RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
                    .map(Self::Rsa)
                    .map_err(|err| SbomSigError::key_load(format!("invalid RSA JWK: {err}")))
            }
            KTY_EC => {
                let crv = jwk
                    .crv
                    .as_deref()
                    .ok_or_else(|| SbomSigError::key_load("EC JWK missing crv"))?;
                let curve = EcCurve::from_jwk_name(crv)?;
                let x = member(jwk.x.as_deref(), "x")?;
                let y = member(jwk.y.as_deref(), "y")?;
                let width = curve.scalar_len();
                if x.len() != width || y.len() != width {
                    return Err(SbomSigError::key_load(format!(
                        "EC JWK coordinates must be {width} bytes for {crv}"
                    )));
                }

                let mut point = Vec::with_capacity(1 + 2 * width);
                point.push(0x04);
                point.extend_from_slice(&x);
                point.extend_from_slice(&y);

                let invalid = |_| SbomSigError::key_load(format!("EC JWK is not a point on {crv}"));
                match curve {
                    EcCurve::P256 => p256::PublicKey::from_sec1_bytes(&point).map(Self::P256).map_err(invalid),
                    EcCurve::P384 => p384::PublicKey::from_sec1_bytes(&point).map(Self::P384).map_err(invalid),
                    EcCurve::P521 => p521::PublicKey::from_sec1_bytes(&point).map(Self::P521).map_err(invalid),
                }
            }
            KTY_OKP => {
                match jwk.crv.as_deref() {
                    Some(CRV_ED25519) => {}
                    other => {
                        return Err(SbomSigError::key_load(format!(
                            "unsupported OKP curve: {}",
                            other.unwrap_or("<none>")
                        )))
                    }
                }
                let x = member(jwk.x.as_deref(), "x")?;
                let bytes: [u8; 32] = x
                    .as_slice()
                    .try_into()
                    .map_err(|_| SbomSigError::key_load("Ed25519 JWK x must be 32 bytes"))?;
                ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                    .map(Self::Ed25519)
                    .map_err(|e| SbomSigError::key_load(format!("invalid Ed25519 JWK: {e}")))
            }
            other => Err(SbomSigError::key_load(format!("unsupported JWK kty: {other}"))),
        }
    }
}

/// Uncompressed SEC1 point `04 || x || y` into a JWK.
fn ec_jwk(curve: EcCurve, sec1: &[u8]) -> Jwk {
    let width = curve.scalar_len();
    let (x, y) = sec1[1..].split_at(width);
    Jwk {
        kty: KTY_EC.to_string(),
        crv: Some(curve.as_str().to_string()),
        n: None,
        e: None,
        x: Some(encode_b64url(x)),
        y: Some(encode_b64url(y)),
    }
}

fn member(value: Option<&str>, name: &str) -> SbomSigResult<Vec<u8>> {
    let v = value.ok_or_else(|| SbomSigError::key_load(format!("JWK missing member {name}")))?;
    decode_b64url(v).map_err(|e| SbomSigError::key_load(format!("JWK member {name}: {e}")))
}
