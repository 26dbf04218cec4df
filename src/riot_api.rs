use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::env;
use std::sync::Mutex;
use std::thread::sleep;
use std::time::{Duration, Instant};

const DEFAULT_MAX_REQS_PER_2MIN: usize = 80;
const DEFAULT_MAX_REQS_PER_SEC: usize = 20;

#[derive(Deserialize)]
pub struct AccountResponse {
    pub puuid: String,
}

fn build_headers() -> Result<HeaderMap> {
    let api_key = env::var("RIOT_API_KEY").context("RIOT_API_KEY is not set")?;

    let mut headers = HeaderMap::new();
    headers.insert("X-Riot-Token", HeaderValue::from_str(&api_key)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(headers)
}

/// Blocking Riot API client. Owns its credentials and rate limiter; it is
/// passed explicitly to whatever builds a match history store and never
/// reaches the chart pipeline.
///
/// `routing` is the continental routing value for account and match lookups
/// (americas / europe / asia); `platform` is the per-server value for
/// summoner lookups (na1, euw1, kr, ...).
pub struct RiotClient {
    client: Client,
    headers: HeaderMap,
    routing: String,
    platform: String,
    limiter: Mutex<RateLimiter>,
}

impl RiotClient {
    pub fn new(routing: &str, platform: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            headers: build_headers()?,
            routing: routing.to_lowercase(),
            platform: platform.to_lowercase(),
            limiter: Mutex::new(RateLimiter::new(
                DEFAULT_MAX_REQS_PER_2MIN,
                DEFAULT_MAX_REQS_PER_SEC,
            )),
        })
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    fn routing_url(&self, path: &str) -> String {
        format!("https://{}.api.riotgames.com{}", self.routing, path)
    }

    fn platform_url(&self, path: &str) -> String {
        format!("https://{}.api.riotgames.com{}", self.platform, path)
    }

    pub fn get_account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<AccountResponse> {
        let url = self.routing_url(&format!(
            "/riot/account/v1/accounts/by-riot-id/{}/{}",
            game_name, tag_line
        ));

        self.get_json(&url)
    }

    pub fn get_summoner_by_puuid(&self, puuid: &str) -> Result<Value> {
        let url = self.platform_url(&format!("/lol/summoner/v4/summoners/by-puuid/{}", puuid));

        self.get_json(&url)
    }

    pub fn get_match_ids_by_puuid(&self, puuid: &str, count: usize) -> Result<Vec<String>> {
        let url = self.routing_url(&format!(
            "/lol/match/v5/matches/by-puuid/{}/ids?start=0&count={}",
            puuid, count
        ));

        self.get_json(&url)
    }

    pub fn get_match_json(&self, match_id: &str) -> Result<Value> {
        let url = self.routing_url(&format!("/lol/match/v5/matches/{}", match_id));

        self.get_json(&url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.request_with_retry(url)?;
        Ok(response.json()?)
    }

    fn request_with_retry(&self, url: &str) -> Result<reqwest::blocking::Response> {
        const MAX_ATTEMPTS: usize = 2;
        let mut attempt = 0;

        loop {
            attempt += 1;

            self.wait_rate_limit();

            let response = self.client.get(url).headers(self.headers.clone()).send()?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= MAX_ATTEMPTS {
                    bail!("Too many requests for URL {}", url);
                }

                if let Some(retry_after) = parse_retry_after(&response) {
                    sleep(retry_after);
                } else {
                    sleep(Duration::from_secs(10));
                }

                continue;
            }

            if !response.status().is_success() {
                bail!(
                    "Request to {} failed with status {}",
                    url,
                    response.status()
                );
            }

            return Ok(response);
        }
    }

    fn wait_rate_limit(&self) {
        let mut guard = self
            .limiter
            .lock()
            .expect("Rate limiter mutex poisoned while waiting");
        guard.wait();
    }
}

pub struct RateLimiter {
    max_reqs_per_2min: usize,
    max_reqs_per_sec: usize,
    timestamps_2min: VecDeque<Instant>,
    timestamps_1s: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_reqs_per_2min: usize, max_reqs_per_sec: usize) -> Self {
        Self {
            max_reqs_per_2min,
            max_reqs_per_sec,
            timestamps_2min: VecDeque::new(),
            timestamps_1s: VecDeque::new(),
        }
    }

    pub fn wait(&mut self) {
        loop {
            let now = Instant::now();
            self.prune(now);

            let mut sleep_duration: Option<Duration> = None;

            if self.timestamps_1s.len() >= self.max_reqs_per_sec {
                if let Some(oldest) = self.timestamps_1s.front() {
                    let elapsed = now.duration_since(*oldest);
                    if elapsed < Duration::from_secs(1) {
                        sleep_duration = Some(Duration::from_secs(1) - elapsed);
                    }
                }
            }

            if sleep_duration.is_none() && self.timestamps_2min.len() >= self.max_reqs_per_2min {
                if let Some(oldest) = self.timestamps_2min.front() {
                    let elapsed = now.duration_since(*oldest);
                    if elapsed < Duration::from_secs(120) {
                        sleep_duration = Some(Duration::from_secs(120) - elapsed);
                    }
                }
            }

            if let Some(duration) = sleep_duration {
                sleep(duration);
                continue;
            }

            let timestamp = Instant::now();
            self.timestamps_1s.push_back(timestamp);
            self.timestamps_2min.push_back(timestamp);
            break;
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.timestamps_1s.front() {
            if now.duration_since(*front) > Duration::from_secs(1) {
                self.timestamps_1s.pop_front();
            } else {
                break;
            }
        }

        while let Some(front) = self.timestamps_2min.front() {
            if now.duration_since(*front) > Duration::from_secs(120) {
                self.timestamps_2min.pop_front();
            } else {
                break;
            }
        }
    }
}

fn parse_retry_after(response: &reqwest::blocking::Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
