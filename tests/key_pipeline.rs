use base64::{engine::general_purpose, Engine as _};
use pasargad::armor::{armor, unarmor, PUBLIC_KEY_LABEL, RSA_PRIVATE_KEY_LABEL};
use pasargad::key_material::{build_private_key_pem, RsaKeyMaterial};
use pasargad::signer::{parse_public_key_pem, verify_signature};
use pasargad::{Error, KeyMaterialError, Signer, XmlKeyComponents};

const XML: &str = include_str!("data/rsa1024.xml");
const WRAPPED_XML: &str = include_str!("data/rsa1024.xml.b64");
const PRIVATE_PEM: &str = include_str!("data/rsa1024-priv.pem");
const PUBLIC_PEM: &str = include_str!("data/rsa1024-pub.pem");
const TEST_SIG_HEX: &str = include_str!("data/rsa1024-sha1-test.hex");

#[test]
fn xml_to_signature_step_by_step() {
    let components = XmlKeyComponents::decode(WRAPPED_XML.as_bytes()).unwrap();
    let pem = build_private_key_pem(&components).unwrap();
    assert_eq!(pem, PRIVATE_PEM);

    let der = unarmor(&pem, RSA_PRIVATE_KEY_LABEL).unwrap();
    let material = RsaKeyMaterial::from_pkcs1_der(&der).unwrap();
    assert_eq!(material, RsaKeyMaterial::from_components(&components).unwrap());

    let signer = Signer::from_pem(&pem).unwrap();
    let raw = signer.sign(b"test").unwrap();
    assert_eq!(hex::encode(&raw), TEST_SIG_HEX.trim());

    let public_key = parse_public_key_pem(PUBLIC_PEM).unwrap();
    assert!(verify_signature(&public_key, b"test", &raw).unwrap());
}

#[test]
fn both_distribution_formats_sign_identically() {
    let plain = Signer::from_xml_key(XML.as_bytes()).unwrap();
    let wrapped = Signer::from_xml_key(WRAPPED_XML.as_bytes()).unwrap();
    let message = br#"{"invoiceNumber":"4029","amount":15000}"#;
    assert_eq!(
        plain.sign_base64(message).unwrap(),
        wrapped.sign_base64(message).unwrap()
    );
    assert_eq!(
        general_purpose::STANDARD
            .decode(plain.sign_base64(message).unwrap())
            .unwrap(),
        plain.sign(message).unwrap()
    );
}

#[test]
fn private_container_is_not_a_public_key() {
    let der = unarmor(PRIVATE_PEM, "").unwrap();
    let relabeled = armor(&der, RSA_PRIVATE_KEY_LABEL).unwrap();
    assert!(matches!(
        unarmor(&relabeled, PUBLIC_KEY_LABEL),
        Err(Error::LabelMismatch { .. })
    ));
}

#[test]
fn missing_component_never_reaches_the_signer() {
    let without_d = XML.replace(
        &XML[XML.find("<D>").unwrap()..XML.find("</D>").unwrap() + 4],
        "",
    );
    assert!(matches!(
        Signer::from_xml_key(without_d.as_bytes()),
        Err(Error::KeyMaterial(KeyMaterialError::MissingComponent("D")))
    ));
}

#[test]
fn line_folded_components_sign_identically() {
    let start = XML.find("<Modulus>").unwrap() + "<Modulus>".len();
    let end = XML.find("</Modulus>").unwrap();
    let modulus = &XML[start..end];
    let folded = format!("{}\n{}", &modulus[..76], &modulus[76..]);
    let doc = XML.replace(modulus, &folded);

    let signer = Signer::from_xml_key(doc.as_bytes()).unwrap();
    assert_eq!(signer.sign_hex(b"test").unwrap(), TEST_SIG_HEX.trim());
}
