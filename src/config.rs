//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수(또는 `.env` 파일)에서 서버 설정값을 읽어옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: 액세스 토큰 검증용 비밀키 (필수)
//! - `HOST`: 서버 바인딩 주소 (기본값 "0.0.0.0")
//! - `PORT`: 서버 포트 번호 (기본값 3000)
//! - `DATABASE_MAX_CONNECTIONS`: 연결 풀 크기 (기본값 5)

use std::env;

/// 애플리케이션 전체 설정
///
/// 서버 시작 시 한 번 읽어서 main()에서만 사용합니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/glooing.db?mode=rwc")
    pub database_url: String,
    /// 외부 계정 서비스와 공유하는 JWT 비밀키
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// 연결 풀의 최대 연결 수
    pub max_connections: u32,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config를 만듭니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`이 없으면 `VarError`를 반환합니다.
    /// 나머지는 값이 없거나 숫자로 파싱되지 않으면 기본값을 씁니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(3000),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(5),
        })
    }
}
