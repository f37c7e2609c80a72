//! glasshouse-auth-core - 认证核心库
//!
//! JWT Claims 与令牌验证逻辑

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use glasshouse_errors::{AppError, AppResult};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username (the demo app keys tokens by name, not id)
    pub username: String,
    /// Admin flag
    pub admin: bool,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Issuer
    #[serde(default)]
    pub iss: String,
}

impl Claims {
    pub fn new(username: &str, admin: bool, expires_in_secs: i64, issuer: &str) -> Self {
        let now = Utc::now();
        Self {
            username: username.to_string(),
            admin,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iss: issuer.to_string(),
        }
    }
}

/// Token 服务
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
    issuer: String,
    insecure_demo_verification: bool,
}

impl TokenService {
    pub fn new(
        secret: &str,
        expires_in: i64,
        issuer: String,
        insecure_demo_verification: bool,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
            issuer,
            insecure_demo_verification,
        }
    }

    /// 生成令牌（HS256，默认两天过期）
    pub fn generate(&self, username: &str, admin: bool) -> AppResult<String> {
        let claims = Claims::new(username, admin, self.expires_in, &self.issuer);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
    }

    /// 验证令牌
    ///
    /// 严格模式：仅接受 HS256 签名，过期与签发者都校验，不允许时间偏差。
    /// 演示模式（`insecure_demo_verification`）：忽略过期时间，并接受
    /// `alg: "none"` 的未签名令牌。无效的 HS256 签名在两种模式下都会被拒绝。
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        if self.insecure_demo_verification && declares_unsigned_algorithm(token) {
            return decode_unsigned(token);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_aud = false;
        validation.leeway = 0; // 不允许时间偏差
        if self.insecure_demo_verification {
            validation.validate_exp = false;
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// 获取令牌过期时间（秒）
    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }
}

/// 判断令牌头部是否声明了未签名算法
fn declares_unsigned_algorithm(token: &str) -> bool {
    let Some(segment) = token.split('.').next() else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(segment) else {
        return false;
    };
    let Ok(header) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return false;
    };
    header.get("alg").and_then(|a| a.as_str()) == Some("none")
}

/// 解析 `alg: "none"` 的未签名令牌
///
/// INSECURE: 不做任何签名校验，只在演示模式下由 [`TokenService::verify`]
/// 调用。令牌必须是三段式且签名段为空。
fn decode_unsigned(token: &str) -> AppResult<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || !segments[2].is_empty() {
        return Err(AppError::unauthorized("Malformed unsigned token"));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|_| AppError::unauthorized("Invalid token header encoding"))?;
    let header: serde_json::Value = serde_json::from_slice(&header_bytes)
        .map_err(|_| AppError::unauthorized("Invalid token header"))?;
    if header.get("alg").and_then(|a| a.as_str()) != Some("none") {
        return Err(AppError::unauthorized("Unexpected token algorithm"));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|_| AppError::unauthorized("Invalid token payload encoding"))?;

    serde_json::from_slice(&payload).map_err(|_| AppError::unauthorized("Invalid token claims"))
}

/// 请求的认证上下文
///
/// 由 GraphQL 中间件填充：携带有效令牌时为已认证，否则匿名。
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub claims: Option<Claims>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { claims: None }
    }

    pub fn authenticated(claims: Claims) -> Self {
        Self {
            claims: Some(claims),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.claims.as_ref().is_some_and(|c| c.admin)
    }

    pub fn username(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.username.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict_service() -> TokenService {
        TokenService::new("test-secret", 3600, "glasshouse".to_string(), false)
    }

    fn demo_service() -> TokenService {
        TokenService::new("test-secret", 3600, "glasshouse".to_string(), true)
    }

    fn unsigned_token(username: &str, admin: bool) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "username": username,
                "admin": admin,
                "iat": 0,
                "exp": 0,
            })
            .to_string(),
        );
        format!("{}.{}.", header, payload)
    }

    #[test]
    fn test_generate_verify_round_trip() {
        let service = strict_service();
        let token = service.generate("admin", true).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.username, "admin");
        assert!(claims.admin);
        assert_eq!(claims.iss, "glasshouse");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_signature_rejected_in_both_modes() {
        let other = TokenService::new("other-secret", 3600, "glasshouse".to_string(), false);
        let token = other.generate("test", false).unwrap();

        assert!(strict_service().verify(&token).is_err());
        assert!(demo_service().verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected_strict_accepted_demo() {
        let expired = TokenService::new("test-secret", -3600, "glasshouse".to_string(), false);
        let token = expired.generate("test", false).unwrap();

        assert!(strict_service().verify(&token).is_err());

        let claims = demo_service().verify(&token).unwrap();
        assert_eq!(claims.username, "test");
    }

    #[test]
    fn test_unsigned_token_accepted_only_in_demo_mode() {
        let token = unsigned_token("admin", true);

        assert!(strict_service().verify(&token).is_err());

        let claims = demo_service().verify(&token).unwrap();
        assert_eq!(claims.username, "admin");
        assert!(claims.admin);
    }

    #[test]
    fn test_unsigned_token_with_signature_segment_rejected() {
        let mut token = unsigned_token("admin", true);
        token.push_str("bogus");

        assert!(demo_service().verify(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected_in_strict_mode() {
        let other = TokenService::new("test-secret", 3600, "elsewhere".to_string(), false);
        let token = other.generate("test", false).unwrap();

        assert!(strict_service().verify(&token).is_err());
    }

    #[test]
    fn test_auth_context() {
        let anon = AuthContext::anonymous();
        assert!(!anon.is_authenticated());
        assert!(!anon.is_admin());
        assert_eq!(anon.username(), None);

        let claims = Claims::new("admin", true, 3600, "glasshouse");
        let ctx = AuthContext::authenticated(claims);
        assert!(ctx.is_authenticated());
        assert!(ctx.is_admin());
        assert_eq!(ctx.username(), Some("admin"));
    }
}
