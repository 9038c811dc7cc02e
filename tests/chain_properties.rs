use chrono::DateTime;
use fortify_ssl::certificate::ValidityWindow;
use fortify_ssl::pem::decode_pem;
use fortify_ssl::{generate_chain, ChainGenerator, SslChain};
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::X509;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::parse_x509_certificate;
use x509_parser::x509::X509Version;

const OID_EXTENDED_KEY_USAGE: &str = "2.5.29.37";
const OID_SUBJECT_ALT_NAME: &str = "2.5.29.17";
const OID_BASIC_CONSTRAINTS: &str = "2.5.29.19";

fn der_of(pem: &[u8]) -> Vec<u8> {
    let text = std::str::from_utf8(pem).expect("pem is utf8");
    let block = decode_pem(text).expect("decode pem");
    assert_eq!(block.tag, "CERTIFICATE");
    block.der
}

fn parse(der: &[u8]) -> X509Certificate<'_> {
    let (rest, cert) = parse_x509_certificate(der).expect("parse x509");
    assert!(rest.is_empty());
    cert
}

fn common_name<'a>(name: &'a x509_parser::x509::X509Name<'_>) -> &'a str {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .expect("common name")
}

fn chain() -> SslChain {
    ChainGenerator::default()
        .generate_blocking()
        .expect("generate chain")
}

#[test]
fn end_to_end_subjects_and_basic_constraints() {
    let chain = chain();
    let root_der = der_of(&chain.root);
    let cert_der = der_of(&chain.cert);
    let root = parse(&root_der);
    let cert = parse(&cert_der);

    assert_eq!(common_name(root.subject()), "Fortify Local CA");
    assert_eq!(common_name(root.issuer()), "Fortify Local CA");
    assert_eq!(common_name(cert.subject()), "fortifyapp.com");
    assert_eq!(root.version(), X509Version::V3);
    assert_eq!(cert.version(), X509Version::V3);

    let root_bc = root
        .basic_constraints()
        .expect("root extensions")
        .expect("root basic constraints");
    assert!(!root_bc.critical);
    assert!(root_bc.value.ca);
    assert_eq!(root_bc.value.path_len_constraint, Some(2));

    let cert_bc = cert
        .basic_constraints()
        .expect("leaf extensions")
        .expect("leaf basic constraints");
    assert!(!cert_bc.critical);
    assert!(!cert_bc.value.ca);
}

#[test]
fn leaf_issuer_equals_ca_subject() {
    let chain = chain();
    let root_der = der_of(&chain.root);
    let cert_der = der_of(&chain.cert);
    let root = parse(&root_der);
    let cert = parse(&cert_der);

    assert_eq!(cert.issuer().as_raw(), root.subject().as_raw());
}

#[test]
fn signatures_verify_against_the_ca_key() {
    let chain = chain();
    let root = X509::from_der(&der_of(&chain.root)).expect("root x509");
    let cert = X509::from_der(&der_of(&chain.cert)).expect("leaf x509");
    let root_key = root.public_key().expect("root public key");

    assert!(root.verify(&root_key).expect("verify root"), "CA must be self-signed");
    assert!(cert.verify(&root_key).expect("verify leaf"), "leaf must be signed by CA");

    let leaf_key = cert.public_key().expect("leaf public key");
    assert!(!cert.verify(&leaf_key).expect("verify leaf with own key"));
}

#[test]
fn exported_key_matches_leaf_certificate() {
    let chain = chain();
    let text = std::str::from_utf8(chain.key()).expect("key utf8");
    let block = decode_pem(text).expect("decode key");
    assert_eq!(block.tag, "RSA PRIVATE KEY");

    let rsa = Rsa::private_key_from_der(&block.der).expect("pkcs1 key");
    assert_eq!(rsa.size() * 8, 2048);
    let key = PKey::from_rsa(rsa).expect("pkey");

    let cert = X509::from_der(&der_of(&chain.cert)).expect("leaf x509");
    assert!(cert.public_key().expect("leaf public key").public_eq(&key));

    let root = X509::from_der(&der_of(&chain.root)).expect("root x509");
    assert!(!root.public_key().expect("root public key").public_eq(&key));
}

#[test]
fn validity_is_one_calendar_year_for_both_certificates() {
    let chain = chain();
    let root_der = der_of(&chain.root);
    let cert_der = der_of(&chain.cert);

    for der in [&root_der, &cert_der] {
        let cert = parse(der);
        let not_before = cert.validity().not_before.timestamp();
        let not_after = cert.validity().not_after.timestamp();
        let start = DateTime::from_timestamp(not_before, 0).expect("not_before in range");
        let expected = ValidityWindow::one_year_from(start)
            .expect("one year later")
            .not_after
            .timestamp();
        assert_eq!(not_after, expected);
    }

    let root = parse(&root_der);
    let cert = parse(&cert_der);
    assert_eq!(
        root.validity().not_before.timestamp(),
        cert.validity().not_before.timestamp()
    );
}

#[test]
fn leaf_extensions_are_eku_san_basic_constraints_in_order() {
    let chain = chain();
    let cert_der = der_of(&chain.cert);
    let cert = parse(&cert_der);

    let order: Vec<(String, bool)> = cert
        .extensions()
        .iter()
        .map(|ext| (ext.oid.to_id_string(), ext.critical))
        .collect();
    assert_eq!(
        order,
        vec![
            (OID_EXTENDED_KEY_USAGE.to_string(), true),
            (OID_SUBJECT_ALT_NAME.to_string(), false),
            (OID_BASIC_CONSTRAINTS.to_string(), false),
        ]
    );

    let root_der = der_of(&chain.root);
    let root = parse(&root_der);
    let root_order: Vec<String> = root
        .extensions()
        .iter()
        .map(|ext| ext.oid.to_id_string())
        .collect();
    assert_eq!(root_order, vec![OID_BASIC_CONSTRAINTS.to_string()]);
}

#[test]
fn eku_is_critical_and_server_auth_only() {
    let chain = chain();
    let cert_der = der_of(&chain.cert);
    let cert = parse(&cert_der);

    let eku = cert
        .extended_key_usage()
        .expect("extensions")
        .expect("extended key usage");
    assert!(eku.critical);
    assert!(eku.value.server_auth);
    assert!(!eku.value.any);
    assert!(!eku.value.client_auth);
    assert!(!eku.value.code_signing);
    assert!(!eku.value.email_protection);
    assert!(!eku.value.time_stamping);
    assert!(!eku.value.ocsp_signing);
    assert!(eku.value.other.is_empty());
}

#[test]
fn san_contains_localhost_and_loopback_ip() {
    let chain = chain();
    let cert_der = der_of(&chain.cert);
    let cert = parse(&cert_der);

    let san = cert
        .subject_alternative_name()
        .expect("extensions")
        .expect("subject alternative name");
    assert!(!san.critical);

    let names = &san.value.general_names;
    assert_eq!(names.len(), 2);
    assert!(matches!(names[0], GeneralName::DNSName("localhost")));
    assert!(matches!(names[1], GeneralName::IPAddress(&[127, 0, 0, 1])));
}

#[test]
fn successive_chains_do_not_reuse_serials_or_keys() {
    let first = chain();
    let second = chain();

    let first_root_der = der_of(&first.root);
    let second_root_der = der_of(&second.root);
    let first_cert_der = der_of(&first.cert);
    let second_cert_der = der_of(&second.cert);

    let first_root = parse(&first_root_der);
    let second_root = parse(&second_root_der);
    let first_cert = parse(&first_cert_der);
    let second_cert = parse(&second_cert_der);

    assert_ne!(first_root.raw_serial(), second_root.raw_serial());
    assert_ne!(first_cert.raw_serial(), second_cert.raw_serial());
    assert_ne!(first_root.raw_serial(), first_cert.raw_serial());

    assert_ne!(first_root.public_key().raw, second_root.public_key().raw);
    assert_ne!(first_cert.public_key().raw, second_cert.public_key().raw);
    assert_ne!(first_root.public_key().raw, first_cert.public_key().raw);
    assert_ne!(first.key(), second.key());
}

#[test]
fn serials_are_at_most_ten_bytes() {
    let chain = chain();
    for pem in [&chain.root, &chain.cert] {
        let der = der_of(pem);
        let cert = parse(&der);
        let serial = cert.raw_serial();
        // A leading 0x00 is added when the high bit of the first random byte is set
        let significant = serial.strip_prefix(&[0u8][..]).unwrap_or(serial);
        assert!(!significant.is_empty() && significant.len() <= 10);
    }
}

#[test]
fn openssl_reads_crlf_pem_output() {
    let chain = chain();
    X509::from_pem(&chain.root).expect("openssl parses CA PEM");
    X509::from_pem(&chain.cert).expect("openssl parses leaf PEM");
    Rsa::private_key_from_pem(chain.key()).expect("openssl parses PKCS#1 key PEM");
}

#[tokio::test]
async fn async_entry_point_produces_a_valid_chain() {
    let chain = generate_chain().await.expect("generate chain");
    let root = X509::from_der(&der_of(&chain.root)).expect("root x509");
    let cert = X509::from_der(&der_of(&chain.cert)).expect("leaf x509");
    assert!(cert
        .verify(&root.public_key().expect("root public key"))
        .expect("verify leaf"));
}
