use convo::auth::{AuthError, Claims, TokenService, ISSUER};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

const SECRET: &[u8] = b"test-secret-must-be-32-bytes-long!!";

fn tokens() -> TokenService {
    TokenService::new(SECRET)
}

#[test]
fn token_roundtrip_ok() {
    let svc = tokens();
    for id in [1, 42, i64::MAX] {
        let token = svc.issue(id).expect("token");
        assert_eq!(svc.verify(&token), Ok(id));
    }
}

#[test]
fn token_carries_issuer_and_no_expiry() {
    let token = tokens().issue(7).unwrap();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    let claims = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &validation)
        .unwrap()
        .claims;
    assert_eq!(claims.user_id, 7);
    assert_eq!(claims.iss, ISSUER);
    assert!(claims.exp.is_none());
    assert!(claims.signed > 0);
}

#[test]
fn other_secret_is_invalid_signature() {
    let token = TokenService::new(b"another-secret-that-is-32-bytes-long").issue(1).unwrap();
    assert_eq!(tokens().verify(&token), Err(AuthError::InvalidSignature));
}

#[test]
fn truncated_or_mutated_token_rejected() {
    let svc = tokens();
    let token = svc.issue(5).unwrap();

    assert!(svc.verify(&token[..token.len() - 4]).is_err());
    // drop the signature segment entirely
    let (head, _) = token.rsplit_once('.').unwrap();
    assert!(svc.verify(head).is_err());

    // swap a character in the middle of the payload segment
    let mut bytes = token.into_bytes();
    let first_dot = bytes.iter().position(|b| *b == b'.').unwrap();
    let i = first_dot + 3;
    bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
    let mutated = String::from_utf8(bytes).unwrap();
    assert!(svc.verify(&mutated).is_err());
}

#[test]
fn garbage_is_malformed() {
    assert_eq!(tokens().verify("garbage"), Err(AuthError::Malformed));
    assert_eq!(tokens().verify(""), Err(AuthError::Malformed));
}

#[test]
fn non_hmac_algorithms_are_malformed() {
    // {"alg":"RS256","typ":"JWT"} . {"user_id":1,"signed":0,"iss":"convo"}
    let rs256 = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.eyJ1c2VyX2lkIjoxLCJzaWduZWQiOjAsImlzcyI6ImNvbnZvIn0.c2ln";
    assert_eq!(tokens().verify(rs256), Err(AuthError::Malformed));
    // {"alg":"none","typ":"JWT"}
    let none = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJ1c2VyX2lkIjoxLCJzaWduZWQiOjAsImlzcyI6ImNvbnZvIn0.";
    assert_eq!(tokens().verify(none), Err(AuthError::Malformed));
}

#[test]
fn other_hmac_variants_verify() {
    let claims = Claims { user_id: 9, signed: 1, iss: ISSUER.into(), exp: None };
    let token = encode(&Header::new(Algorithm::HS512), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
    assert_eq!(tokens().verify(&token), Ok(9));
}

#[test]
fn claims_without_user_id_are_malformed() {
    #[derive(serde::Serialize)]
    struct Bare { iss: &'static str }
    let token = encode(&Header::default(), &Bare { iss: ISSUER }, &EncodingKey::from_secret(SECRET)).unwrap();
    assert_eq!(tokens().verify(&token), Err(AuthError::Malformed));
}
