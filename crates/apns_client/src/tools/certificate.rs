/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::tools::error::CertificateError;
use openssl::{
    asn1::Asn1Time,
    nid::Nid,
    pkcs12::Pkcs12,
    pkey::{PKey, Private},
    stack::Stack,
    x509::{
        store::{X509Store, X509StoreBuilder},
        X509StoreContext, X509,
    },
};
use std::{cmp::Ordering, path::Path};
use tracing::{info, warn};

// Verification results from x509_vfy.h that only mean the issuing authority is
// not in the trust store. Apple's push CA usually is not.
const X509_V_OK: i32 = 0;
const X509_V_ERR_UNABLE_TO_GET_ISSUER_CERT: i32 = 2;
const X509_V_ERR_DEPTH_ZERO_SELF_SIGNED_CERT: i32 = 18;
const X509_V_ERR_SELF_SIGNED_CERT_IN_CHAIN: i32 = 19;
const X509_V_ERR_UNABLE_TO_GET_ISSUER_CERT_LOCALLY: i32 = 20;
const X509_V_ERR_UNABLE_TO_VERIFY_LEAF_SIGNATURE: i32 = 21;

const UNKNOWN_AUTHORITY: [i32; 5] = [
    X509_V_ERR_UNABLE_TO_GET_ISSUER_CERT,
    X509_V_ERR_DEPTH_ZERO_SELF_SIGNED_CERT,
    X509_V_ERR_SELF_SIGNED_CERT_IN_CHAIN,
    X509_V_ERR_UNABLE_TO_GET_ISSUER_CERT_LOCALLY,
    X509_V_ERR_UNABLE_TO_VERIFY_LEAF_SIGNATURE,
];

/// Client certificate and key used for mutual TLS with APNs.
#[derive(Clone, Debug)]
pub struct Credential {
    /// DER encoding of `leaf`.
    pub certificate: Vec<u8>,
    pub private_key: PKey<Private>,
    pub leaf: X509,
    /// CA certificates bundled in the container, presented after the leaf.
    pub chain: Vec<X509>,
}

impl Credential {
    /// Key (PKCS#8) followed by the leaf and then the bundled chain, all PEM.
    pub fn to_pem(&self) -> Result<Vec<u8>, CertificateError> {
        let mut pem = self
            .private_key
            .private_key_to_pem_pkcs8()
            .map_err(CertificateError::Encode)?;
        pem.extend(self.leaf.to_pem().map_err(CertificateError::Encode)?);
        for ca in &self.chain {
            pem.extend(ca.to_pem().map_err(CertificateError::Encode)?);
        }
        Ok(pem)
    }

    pub fn identity(&self) -> Result<reqwest::Identity, CertificateError> {
        reqwest::Identity::from_pem(&self.to_pem()?)
            .map_err(|err| CertificateError::Identity(err.to_string()))
    }

    pub fn common_name(&self) -> Option<String> {
        self.leaf
            .subject_name()
            .entries_by_nid(Nid::COMMONNAME)
            .next()
            .and_then(|entry| entry.data().as_utf8().ok())
            .map(|name| name.to_string())
    }
}

/// Reads a PKCS#12 file and loads it with [`load_certificate_from_bytes`].
pub fn load_certificate(
    path: impl AsRef<Path>,
    password: &str,
) -> Result<Credential, CertificateError> {
    let path = path.as_ref();
    let p12 = std::fs::read(path).map_err(|source| CertificateError::Read {
        path: path.display().to_string(),
        source,
    })?;
    load_certificate_from_bytes(&p12, password)
}

/// Decodes a PKCS#12 container and checks its certificate against the system trust roots.
///
/// An unknown issuing authority is accepted; any other verification failure is not.
pub fn load_certificate_from_bytes(
    p12: &[u8],
    password: &str,
) -> Result<Credential, CertificateError> {
    let mut roots = X509StoreBuilder::new().map_err(CertificateError::TrustStore)?;
    roots
        .set_default_paths()
        .map_err(CertificateError::TrustStore)?;
    decode_and_verify(p12, password, roots.build())
}

/// Same as [`load_certificate_from_bytes`] but trusts only `roots`.
pub fn load_certificate_with_roots(
    p12: &[u8],
    password: &str,
    roots: &[X509],
) -> Result<Credential, CertificateError> {
    let mut store = X509StoreBuilder::new().map_err(CertificateError::TrustStore)?;
    for root in roots {
        store
            .add_cert(root.to_owned())
            .map_err(CertificateError::TrustStore)?;
    }
    decode_and_verify(p12, password, store.build())
}

fn decode_and_verify(
    p12: &[u8],
    password: &str,
    roots: X509Store,
) -> Result<Credential, CertificateError> {
    let parsed = Pkcs12::from_der(p12)
        .map_err(CertificateError::Malformed)?
        .parse2(password)
        .map_err(CertificateError::Decode)?;

    let private_key = parsed.pkey.ok_or(CertificateError::MissingKey)?;
    let leaf = parsed.cert.ok_or(CertificateError::MissingCertificate)?;
    let chain: Vec<X509> = parsed
        .ca
        .map(|stack| stack.into_iter().collect())
        .unwrap_or_default();

    verify_chain(&leaf, &chain, &roots)?;

    let certificate = leaf.to_der().map_err(CertificateError::Encode)?;
    let credential = Credential {
        certificate,
        private_key,
        leaf,
        chain,
    };

    info!(
        tag = "[CERTIFICATE]",
        common_name = %credential.common_name().unwrap_or_default(),
        not_after = %credential.leaf.not_after(),
        "Loaded push certificate"
    );

    Ok(credential)
}

fn verify_chain(leaf: &X509, chain: &[X509], roots: &X509Store) -> Result<(), CertificateError> {
    let mut untrusted = Stack::<X509>::new().map_err(CertificateError::TrustStore)?;
    for ca in chain {
        untrusted
            .push(ca.to_owned())
            .map_err(CertificateError::TrustStore)?;
    }

    let mut context = X509StoreContext::new().map_err(CertificateError::TrustStore)?;
    let result = context
        .init(roots, leaf, &untrusted, |ctx| {
            ctx.verify_cert().map(|_| ctx.error())
        })
        .map_err(CertificateError::TrustStore)?;

    match result.as_raw() {
        X509_V_OK => Ok(()),
        code if UNKNOWN_AUTHORITY.contains(&code) => {
            // Chain building stops at the missing issuer before dates are checked.
            check_validity(leaf)?;
            warn!(
                tag = "[CERTIFICATE]",
                reason = result.error_string(),
                "Certificate issuer is not trusted locally, continuing"
            );
            Ok(())
        }
        _ => Err(CertificateError::Verification(
            result.error_string().to_string(),
        )),
    }
}

fn check_validity(leaf: &X509) -> Result<(), CertificateError> {
    let now = Asn1Time::days_from_now(0).map_err(CertificateError::TrustStore)?;

    let not_before = leaf
        .not_before()
        .compare(&now)
        .map_err(CertificateError::TrustStore)?;
    let not_after = leaf
        .not_after()
        .compare(&now)
        .map_err(CertificateError::TrustStore)?;

    match (not_before, not_after) {
        (Ordering::Greater, _) => Err(CertificateError::Verification(
            "certificate is not yet valid".to_string(),
        )),
        (_, Ordering::Less) => Err(CertificateError::Verification(
            "certificate has expired".to_string(),
        )),
        _ => Ok(()),
    }
}
