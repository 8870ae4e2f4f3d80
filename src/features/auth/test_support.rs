#![allow(clippy::unwrap_used)]

use crate::features::auth::{
    error::AuthError,
    repository::AuthRepository,
    types::{
        LoginRequest, MessageResponse, ResendOtpRequest, ResendOtpResponse, SessionResponse,
        SignupRequest, VerifyOtpRequest,
    },
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Mutex, time::Duration};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    Signup,
    Login,
    VerifyOtp,
    ResendOtp,
    RefreshToken,
    Logout,
}

/// Canned-reply repository. Replies are JSON so one value can be decoded as
/// whichever response type the called method returns.
#[derive(Default)]
pub(crate) struct FakeRepository {
    replies: Mutex<HashMap<Op, Result<Value, AuthError>>>,
    delays: Mutex<HashMap<Op, Duration>>,
    calls: Mutex<Vec<Op>>,
}

impl FakeRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(self, op: Op, reply: Result<Value, AuthError>) -> Self {
        self.set(op, reply);
        self
    }

    pub(crate) fn with_delay(self, op: Op, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(op, delay);
        self
    }

    pub(crate) fn set(&self, op: Op, reply: Result<Value, AuthError>) {
        self.replies.lock().unwrap().insert(op, reply);
    }

    pub(crate) fn calls(&self) -> Vec<Op> {
        self.calls.lock().unwrap().clone()
    }

    async fn reply<T: DeserializeOwned>(&self, op: Op) -> Result<T, AuthError> {
        self.calls.lock().unwrap().push(op);
        let delay = self.delays.lock().unwrap().get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&op)
            .cloned()
            .unwrap_or_else(|| Err(AuthError::Api(format!("no reply for {op:?}"))));
        reply.map(|value| serde_json::from_value(value).unwrap())
    }
}

#[async_trait]
impl AuthRepository for FakeRepository {
    async fn signup(&self, _request: &SignupRequest) -> Result<MessageResponse, AuthError> {
        self.reply(Op::Signup).await
    }

    async fn login(&self, _request: &LoginRequest) -> Result<MessageResponse, AuthError> {
        self.reply(Op::Login).await
    }

    async fn verify_otp(&self, _request: &VerifyOtpRequest) -> Result<SessionResponse, AuthError> {
        self.reply(Op::VerifyOtp).await
    }

    async fn resend_otp(
        &self,
        _request: &ResendOtpRequest,
    ) -> Result<ResendOtpResponse, AuthError> {
        self.reply(Op::ResendOtp).await
    }

    async fn refresh_token(&self) -> Result<SessionResponse, AuthError> {
        self.reply(Op::RefreshToken).await
    }

    async fn logout(&self) -> Result<MessageResponse, AuthError> {
        self.reply(Op::Logout).await
    }
}

pub(crate) fn user_json() -> Value {
    json!({
        "id": "u1",
        "email": "ada@example.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "role": "member"
    })
}
