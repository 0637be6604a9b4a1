#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// What the caller does once a submission settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResolution {
    pub notice: Notice,
    pub close: bool,
    pub refresh: bool,
}

impl SubmitResolution {
    pub fn done(notice: Notice) -> Self {
        Self {
            notice,
            close: true,
            refresh: true,
        }
    }

    pub fn stay_open(notice: Notice) -> Self {
        Self {
            notice,
            close: false,
            refresh: false,
        }
    }
}
