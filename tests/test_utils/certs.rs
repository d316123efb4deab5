//! Throwaway certificate authorities and server identities for TLS tests.
//!
//! Keys are P-256 so generation stays fast. Certificates are valid from now
//! for one day.

use std::io::Write;

use native_tls::Identity;
use openssl::{
    asn1::{Asn1Integer, Asn1Time},
    bn::{BigNum, MsbOption},
    ec::{EcGroup, EcKey},
    hash::MessageDigest,
    nid::Nid,
    pkey::{PKey, Private},
    x509::{
        X509, X509Builder, X509Name, X509NameBuilder,
        extension::{
            AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage,
            SubjectAlternativeName, SubjectKeyIdentifier,
        },
    },
};
use tempfile::NamedTempFile;

fn new_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).expect("p-256 group");
    let key = EcKey::generate(&group).expect("generate ec key");
    PKey::from_ec_key(key).expect("wrap ec key")
}

fn name(common_name: &str) -> X509Name {
    let mut builder = X509NameBuilder::new().expect("name builder");
    builder
        .append_entry_by_text("CN", common_name)
        .expect("append common name");
    builder.build()
}

fn serial() -> Asn1Integer {
    let mut bn = BigNum::new().expect("bignum");
    bn.rand(64, MsbOption::MAYBE_ZERO, false)
        .expect("random serial");
    bn.to_asn1_integer().expect("serial to asn1")
}

fn base_builder(subject: &X509Name, key: &PKey<Private>) -> X509Builder {
    let mut builder = X509::builder().expect("x509 builder");
    builder.set_version(2).expect("set version");
    builder.set_serial_number(&serial()).expect("set serial");
    builder.set_subject_name(subject).expect("set subject");
    builder.set_pubkey(key).expect("set public key");
    builder
        .set_not_before(&Asn1Time::days_from_now(0).expect("now"))
        .expect("set not before");
    builder
        .set_not_after(&Asn1Time::days_from_now(1).expect("tomorrow"))
        .expect("set not after");
    builder
}

fn append_server_extensions(
    builder: &mut X509Builder,
    issuer: Option<&X509>,
    dns_names: &[&str],
    ip_addresses: &[&str],
) {
    builder
        .append_extension(BasicConstraints::new().build().expect("basic constraints"))
        .expect("append basic constraints");
    builder
        .append_extension(
            KeyUsage::new()
                .critical()
                .digital_signature()
                .key_encipherment()
                .build()
                .expect("key usage"),
        )
        .expect("append key usage");
    builder
        .append_extension(
            ExtendedKeyUsage::new()
                .server_auth()
                .build()
                .expect("extended key usage"),
        )
        .expect("append extended key usage");
    let mut san = SubjectAlternativeName::new();
    for dns in dns_names {
        san.dns(dns);
    }
    for ip in ip_addresses {
        san.ip(ip);
    }
    let san = san
        .build(&builder.x509v3_context(issuer.map(|cert| &**cert), None))
        .expect("subject alt name");
    builder.append_extension(san).expect("append subject alt name");
}

/// Key pair and certificate presented by a test collector.
pub struct ServerIdentity {
    pub cert: X509,
    key: PKey<Private>,
}

impl ServerIdentity {
    /// Self-signed certificate that no verifier would trust.
    pub fn self_signed(dns_names: &[&str], ip_addresses: &[&str]) -> Self {
        let key = new_key();
        let subject = name("self-signed-collector");
        let mut builder = base_builder(&subject, &key);
        builder.set_issuer_name(&subject).expect("set issuer");
        append_server_extensions(&mut builder, None, dns_names, ip_addresses);
        builder
            .sign(&key, MessageDigest::sha256())
            .expect("sign certificate");
        Self {
            cert: builder.build(),
            key,
        }
    }

    /// Identity for `native_tls::TlsAcceptor`.
    pub fn identity(&self) -> Identity {
        let cert = self.cert.to_pem().expect("certificate pem");
        let key = self.key.private_key_to_pem_pkcs8().expect("pkcs8 key pem");
        Identity::from_pkcs8(&cert, &key).expect("build identity")
    }
}

/// Certificate authority able to issue server certificates.
pub struct TestCa {
    pub cert: X509,
    key: PKey<Private>,
}

impl TestCa {
    pub fn new(common_name: &str) -> Self {
        let key = new_key();
        let subject = name(common_name);
        let mut builder = base_builder(&subject, &key);
        builder.set_issuer_name(&subject).expect("set issuer");
        builder
            .append_extension(
                BasicConstraints::new()
                    .critical()
                    .ca()
                    .build()
                    .expect("ca constraints"),
            )
            .expect("append ca constraints");
        builder
            .append_extension(
                KeyUsage::new()
                    .critical()
                    .key_cert_sign()
                    .crl_sign()
                    .build()
                    .expect("ca key usage"),
            )
            .expect("append ca key usage");
        let ski = SubjectKeyIdentifier::new()
            .build(&builder.x509v3_context(None, None))
            .expect("subject key id");
        builder.append_extension(ski).expect("append subject key id");
        builder
            .sign(&key, MessageDigest::sha256())
            .expect("sign ca certificate");
        Self {
            cert: builder.build(),
            key,
        }
    }

    /// Issue a server certificate for the given names.
    pub fn issue(&self, dns_names: &[&str], ip_addresses: &[&str]) -> ServerIdentity {
        let key = new_key();
        let mut builder = base_builder(&name("collector"), &key);
        builder
            .set_issuer_name(self.cert.subject_name())
            .expect("set issuer");
        append_server_extensions(&mut builder, Some(&self.cert), dns_names, ip_addresses);
        let aki = AuthorityKeyIdentifier::new()
            .keyid(false)
            .issuer(false)
            .build(&builder.x509v3_context(Some(&self.cert), None))
            .expect("authority key id");
        builder.append_extension(aki).expect("append authority key id");
        builder
            .sign(&self.key, MessageDigest::sha256())
            .expect("sign server certificate");
        ServerIdentity {
            cert: builder.build(),
            key,
        }
    }

    /// Write the CA certificate as PEM to a temporary file.
    pub fn pem_file(&self) -> NamedTempFile {
        write_temp(&self.cert.to_pem().expect("ca pem"))
    }

    /// Write the CA certificate as DER to a temporary file.
    pub fn der_file(&self) -> NamedTempFile {
        write_temp(&self.cert.to_der().expect("ca der"))
    }
}

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp certificate file");
    file.write_all(bytes).expect("write certificate");
    file.flush().expect("flush certificate");
    file
}
