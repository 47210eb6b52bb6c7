// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound email for password-reset links.
//!
//! The relay call runs on its own task so the forgot-password response time
//! does not depend on whether an account exists. Those tasks are tracked and
//! [`Mailer::flush`] waits for them on shutdown.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinSet;

use reqwest::Client;
use serde::Serialize;

use crate::config::Config;
use crate::services::credentials::ResetTicket;

/// One message as posted to the relay.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Clone)]
enum Transport {
    /// POST JSON to an HTTP mail relay
    Relay {
        client: Client,
        url: String,
        in_flight: Arc<Mutex<JoinSet<()>>>,
    },
    /// No relay configured; log that a message would have been sent
    LogOnly,
    /// Keep messages in memory (tests)
    Capture(Arc<Mutex<Vec<OutgoingMail>>>),
}

#[derive(Clone)]
pub struct Mailer {
    from: String,
    frontend_url: String,
    transport: Transport,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        let transport = match &config.mail_relay_url {
            Some(url) => Transport::Relay {
                client: Client::new(),
                url: url.clone(),
                in_flight: Arc::new(Mutex::new(JoinSet::new())),
            },
            None => {
                tracing::warn!("MAIL_RELAY_URL not set; reset emails will only be logged");
                Transport::LogOnly
            }
        };
        Self {
            from: config.mail_from.clone(),
            frontend_url: config.frontend_url.clone(),
            transport,
        }
    }

    /// Mailer that records messages instead of sending them.
    pub fn capturing(config: &Config) -> Self {
        Self {
            from: config.mail_from.clone(),
            frontend_url: config.frontend_url.clone(),
            transport: Transport::Capture(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Messages captured so far (empty unless built with [`Mailer::capturing`]).
    pub fn sent(&self) -> Vec<OutgoingMail> {
        match &self.transport {
            Transport::Capture(outbox) => outbox
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
            _ => Vec::new(),
        }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password/{}", self.frontend_url, token)
    }

    pub fn send_password_reset(&self, ticket: &ResetTicket) {
        let mail = OutgoingMail {
            from: self.from.clone(),
            to: ticket.email.clone(),
            subject: "Restablece tu contraseña de EvolutFit".to_string(),
            text: format!(
                "Hola {},\n\nPara elegir una nueva contraseña abre este enlace:\n{}\n\n\
                 El enlace caduca en 1 hora. Si no lo solicitaste, ignora este mensaje.\n",
                ticket.name,
                self.reset_link(&ticket.token)
            ),
        };
        self.dispatch(mail);
    }

    /// Wait up to `timeout` for relay deliveries still in flight.
    ///
    /// Returns how many deliveries finished; any left after the timeout are
    /// aborted and logged.
    pub async fn flush(&self, timeout: Duration) -> usize {
        let Transport::Relay { in_flight, .. } = &self.transport else {
            return 0;
        };
        let mut tasks = std::mem::take(
            &mut *in_flight
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        let mut finished = 0;
        let drained = tokio::time::timeout(timeout, async {
            while tasks.join_next().await.is_some() {
                finished += 1;
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!(abandoned = tasks.len(), "Mail deliveries still pending at shutdown");
            tasks.abort_all();
        }
        finished
    }

    fn dispatch(&self, mail: OutgoingMail) {
        match &self.transport {
            Transport::Relay {
                client,
                url,
                in_flight,
            } => {
                let client = client.clone();
                let url = url.clone();
                let mut tasks = in_flight
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                // Reap finished deliveries so the set stays small.
                while tasks.try_join_next().is_some() {}
                tasks.spawn(async move {
                    let result = client
                        .post(&url)
                        .json(&mail)
                        .send()
                        .await
                        .and_then(|response| response.error_for_status());
                    match result {
                        Ok(_) => tracing::info!(subject = %mail.subject, "Mail relayed"),
                        Err(e) => tracing::error!(error = %e, "Mail relay failed"),
                    }
                });
            }
            Transport::LogOnly => {
                tracing::info!(subject = %mail.subject, "Mail delivery skipped (no relay configured)");
            }
            Transport::Capture(outbox) => {
                outbox
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(mail);
            }
        }
    }
}
