#![forbid(unsafe_code)]

use std::fmt;

use crate::command::ActionId;

/// Acknowledgement returned by fire-and-forget handlers. The message is the
/// spoken confirmation ("Hesap makinesi açılıyor").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerAck {
    pub message: String,
}

impl HandlerAck {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    UnknownTarget(String),
    SpawnFailed(String),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTarget(target) => write!(f, "uygulama tanımlı değil: {target}"),
            Self::SpawnFailed(detail) => write!(f, "uygulama başlatılamadı: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    MissingApiKey(&'static str),
    UnknownAction(String),
    MissingArgument(String),
    Transport(String),
    Upstream { provider: &'static str, status: u16 },
    MalformedResponse(&'static str),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey(provider) => write!(f, "servis anahtarı eksik: {provider}"),
            Self::UnknownAction(action) => write!(f, "servis eylemi tanımlı değil: {action}"),
            Self::MissingArgument(action) => {
                write!(f, "bu servis için bir ifade gerekli: {action}")
            }
            Self::Transport(detail) => write!(f, "servise ulaşılamadı: {detail}"),
            Self::Upstream { provider, status } => {
                write!(f, "servis hatası: {provider} durum {status}")
            }
            Self::MalformedResponse(provider) => {
                write!(f, "servis yanıtı çözümlenemedi: {provider}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemError {
    UnknownAction(String),
    CommandFailed(String),
    ClockUnavailable,
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAction(action) => write!(f, "sistem eylemi tanımlı değil: {action}"),
            Self::CommandFailed(detail) => write!(f, "sistem komutu başarısız: {detail}"),
            Self::ClockUnavailable => write!(f, "saat bilgisi alınamadı"),
        }
    }
}

/// Capability seams the dispatcher calls through. One per command category;
/// implementations live outside the core and are bound into a handler table
/// at construction time. `Send + Sync` so concurrent dispatches can share
/// one table without locking.
pub trait LaunchApplications: Send + Sync {
    fn launch_application(&self, target: &str) -> Result<HandlerAck, LaunchError>;
}

pub trait CallWebServices: Send + Sync {
    fn call_web_service(
        &self,
        action_id: &ActionId,
        argument: Option<&str>,
    ) -> Result<String, ServiceError>;
}

pub trait InvokeSystemActions: Send + Sync {
    fn invoke_system_action(&self, action_id: &ActionId) -> Result<HandlerAck, SystemError>;
}
