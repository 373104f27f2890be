// src/notify.rs

/// Aviso passageiro para quem está operando o painel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Padrão: os avisos vão para o log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Success(message) => tracing::info!("✅ {}", message),
            Notice::Error(message) => tracing::warn!("⚠️ {}", message),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::{Notice, Notifier};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        pub fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }

        pub fn errors(&self) -> usize {
            self.notices().iter().filter(|n| matches!(n, Notice::Error(_))).count()
        }

        pub fn last(&self) -> Option<Notice> {
            self.notices.lock().unwrap().last().cloned()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }
}
