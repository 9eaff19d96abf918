use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol;
use crate::types::*;
use crate::{Error, Result};

/// Bearer session obtained from the token endpoint. Expiry is tracked but
/// never checked proactively; a 401 is what actually retires a token.
struct Session {
    access_token: String,
    #[allow(dead_code)]
    expires_at: Instant,
}

pub struct AlteregoClientBuilder {
    username: String,
    password: String,
    oauth_url: String,
    base_url: String,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl AlteregoClientBuilder {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            oauth_url: protocol::OAUTH_URL.to_string(),
            base_url: protocol::API_BASE_URL.to_string(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn oauth_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_url = url.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> AlteregoClient {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(protocol::REQUEST_TIMEOUT_SECS))
            .user_agent(protocol::USER_AGENT)
            .default_headers(headers)
            .build()
            .expect("failed to build HTTP client");

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => {
                Some(MessageLogger::new(mode, &path).expect("failed to open log file"))
            }
            _ => None,
        };

        AlteregoClient {
            http,
            oauth_url: self.oauth_url,
            base_url: self.base_url,
            username: self.username,
            password: self.password,
            session: None,
            logger,
        }
    }
}

pub struct AlteregoClient {
    http: reqwest::Client,
    oauth_url: String,
    base_url: String,
    username: String,
    password: String,
    session: Option<Session>,
    logger: Option<MessageLogger>,
}

impl AlteregoClient {
    pub fn builder(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> AlteregoClientBuilder {
        AlteregoClientBuilder::new(username, password)
    }

    /// OAuth2 password grant against the token endpoint. Stores the session
    /// and returns the raw token payload.
    pub async fn authenticate(&mut self) -> Result<TokenPayload> {
        debug!(url = %self.oauth_url, "authenticating");

        let form = protocol::auth_form(&self.username, &self.password);
        let resp = self.http.post(&self.oauth_url).form(&form).send().await?;
        let status = resp.status().as_u16();

        if let Some(ref mut logger) = self.logger {
            logger.log_auth(status);
        }

        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            warn!(status, body = %body, "authentication failed");
            return Err(Error::Authentication { status });
        }

        let text = resp.text().await?;
        let payload: TokenPayload = serde_json::from_str(&text)?;
        let expires_in = payload
            .expires_in
            .unwrap_or(protocol::DEFAULT_EXPIRES_IN_SECS);
        self.session = Some(Session {
            access_token: payload.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        });

        debug!(expires_in, "authentication successful");
        Ok(payload)
    }

    /// One authenticated GET against `{base}/{path}`.
    pub async fn get(&mut self, path: &str) -> Result<Value> {
        self.request(Method::GET, Some(path), None).await
    }

    /// One authenticated POST of a JSON body against `{base}/{path}`.
    pub async fn post(&mut self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, Some(path), Some(body)).await
    }

    /// Authenticated request with the one-shot 401 recovery: authenticate
    /// lazily if no session, send, and on a 401 re-authenticate exactly
    /// once and retry exactly once. The retry's outcome is final.
    async fn request(
        &mut self,
        method: Method,
        path: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        if self.session.is_none() {
            self.authenticate().await?;
        }

        let url = match path {
            Some(p) => format!("{}/{p}", self.base_url),
            None => self.base_url.clone(),
        };

        let first = self.send(method.clone(), &url, body).await?;
        let resp = if first.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!(url = %url, "token rejected, re-authenticating once");
            self.authenticate().await?;
            self.send(method, &url, body).await?
        } else {
            first
        };

        let status = resp.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "API request failed");
            return Err(Error::Api {
                status: status.as_u16(),
            });
        }

        let text = resp.text().await?;
        if let Some(ref mut logger) = self.logger {
            logger.log_response(status.as_u16(), &text);
        }
        serde_json::from_str(&text).map_err(Error::Json)
    }

    async fn send(
        &mut self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        if let Some(ref mut logger) = self.logger {
            logger.log_request(method.as_str(), url, body);
        }

        let mut req = self.http.request(method, url);
        if let Some(ref session) = self.session {
            req = req.bearer_auth(&session.access_token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req.send().await?)
    }

    // -- Resource operations --

    pub async fn get_zones(&mut self, station_id: &str) -> Result<Vec<Zone>> {
        let raw = self.get(&protocol::zones_path(station_id)).await?;
        serde_json::from_value(raw).map_err(Error::Json)
    }

    pub async fn get_global_status(&mut self, station_id: &str) -> Result<GlobalEnvelope> {
        let raw = self.get(&protocol::global_path(station_id)).await?;
        serde_json::from_value(raw).map_err(Error::Json)
    }

    pub async fn get_deums(&mut self, station_id: &str) -> Result<Vec<Deum>> {
        let raw = self.get(&protocol::deums_path(station_id)).await?;
        serde_json::from_value(raw).map_err(Error::Json)
    }

    pub async fn get_timers(&mut self, station_id: &str) -> Result<Vec<Timer>> {
        let raw = self.get(&protocol::timers_path(station_id)).await?;
        serde_json::from_value(raw).map_err(Error::Json)
    }

    /// Stations visible to this account, from the base resource.
    pub async fn get_stations(&mut self) -> Result<Vec<Station>> {
        let raw = self.request(Method::GET, None, None).await?;
        serde_json::from_value(raw).map_err(Error::Json)
    }

    pub async fn update_zone(
        &mut self,
        station_id: &str,
        zone_id: &str,
        data: &Value,
    ) -> Result<Value> {
        self.post(&protocol::zone_path(station_id, zone_id), data).await
    }

    pub async fn update_timer(
        &mut self,
        station_id: &str,
        timer_id: &str,
        data: &Value,
    ) -> Result<Value> {
        self.post(&protocol::timer_path(station_id, timer_id), data).await
    }

    pub async fn update_deum(
        &mut self,
        station_id: &str,
        deum_id: &str,
        data: &Value,
    ) -> Result<Value> {
        self.post(&protocol::deum_path(station_id, deum_id), data).await
    }

    pub async fn update_global(&mut self, station_id: &str, data: &Value) -> Result<Value> {
        self.post(&protocol::global_path(station_id), data).await
    }

    // -- Command methods --

    /// Set the operating-mode override for a zone.
    pub async fn set_zone_forcing(
        &mut self,
        station_id: &str,
        zone_id: &str,
        forcing: Forcing,
    ) -> Result<Value> {
        let data = protocol::set_forcing_data(forcing);
        self.update_zone(station_id, zone_id, &data).await
    }

    /// Write a zone temperature setpoint into the params field selected by
    /// the zone's forcing and the station season.
    pub async fn set_zone_setpoint(
        &mut self,
        station_id: &str,
        zone_id: &str,
        forcing: Forcing,
        season: Season,
        value: f64,
    ) -> Result<Value> {
        let data = protocol::set_zone_setpoint_data(forcing, season, value);
        self.update_zone(station_id, zone_id, &data).await
    }

    /// Set a zone's relative-humidity setpoint (summer dehumidification).
    pub async fn set_zone_humidity_setpoint(
        &mut self,
        station_id: &str,
        zone_id: &str,
        value: f64,
    ) -> Result<Value> {
        let data = protocol::set_humidity_setpoint_data(value);
        self.update_zone(station_id, zone_id, &data).await
    }

    /// Switch the station between WINTER and SUMMER.
    pub async fn set_season(&mut self, station_id: &str, season: Season) -> Result<Value> {
        let data = protocol::set_season_data(season);
        self.update_global(station_id, &data).await
    }

    /// Write one weekly-schedule slot.
    pub async fn set_timer_slot(
        &mut self,
        station_id: &str,
        timer_id: &str,
        day: Weekday,
        slot: usize,
        value: &SlotValue,
    ) -> Result<Value> {
        let data = protocol::set_timer_slot_data(day, slot, value);
        self.update_timer(station_id, timer_id, &data).await
    }

    /// Set a dehumidifier's speed override.
    pub async fn set_deum_override(
        &mut self,
        station_id: &str,
        deum_id: &str,
        mode: DeumOverride,
    ) -> Result<Value> {
        let data = protocol::set_deum_override_data(mode);
        self.update_deum(station_id, deum_id, &data).await
    }

    /// Start or adjust a dehumidifier boost, carrying the current vent
    /// speeds forward.
    pub async fn set_deum_boost(
        &mut self,
        station_id: &str,
        deum_id: &str,
        minutes: i64,
        params: &DeumParams,
    ) -> Result<Value> {
        let data = protocol::set_deum_boost_data(minutes, params);
        self.update_deum(station_id, deum_id, &data).await
    }

    /// Drop the session and close the message log. Idempotent; the HTTP
    /// connection pool itself is released when the client is dropped.
    pub fn close(&mut self) {
        self.session = None;
        self.logger = None;
    }
}
