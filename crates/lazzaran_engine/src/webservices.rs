#![forbid(unsafe_code)]

use std::time::Duration;

use serde_json::{json, Value};

use lazzaran_contracts::command::ActionId;
use lazzaran_contracts::handler::{CallWebServices, ServiceError};
use lazzaran_contracts::settings::EngineSettings;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

const GOOGLE_URL: &str = "https://www.google.com";
const YOUTUBE_URL: &str = "https://www.youtube.com";
const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search?q=";

const DEFAULT_WEATHER_CITY: &str = "Istanbul";
const MAX_HEADLINES: usize = 5;

/// Conversation frame sent ahead of every chat turn. The assistant has no
/// persistent conversation memory; each turn stands alone.
const CHAT_PERSONA_PROMPT: &str =
    "Sen Türkçe konuşan bir sesli asistansın. Tüm yanıtlarını Türkçe olarak ver \
     ve doğal, arkadaşça bir ton kullan. Kısa ve konuşmaya uygun cevaplar ver.";

/// Routes web-service actions to their provider clients. Clients whose API
/// key is absent stay unconfigured and refuse with `MissingApiKey` instead
/// of failing startup.
pub struct WebServiceRouter {
    weather: Option<WeatherClient>,
    news: Option<NewsClient>,
    chat: Option<ChatClient>,
}

impl WebServiceRouter {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(HTTP_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .build();
        let keys = &settings.provider_keys;
        Self {
            weather: keys
                .weather_api_key
                .clone()
                .map(|key| WeatherClient::new(agent.clone(), key)),
            news: keys
                .news_api_key
                .clone()
                .map(|key| NewsClient::new(agent.clone(), key)),
            chat: keys
                .gemini_api_key
                .clone()
                .map(|key| ChatClient::new(agent.clone(), key)),
        }
    }

    fn weather(&self) -> Result<&WeatherClient, ServiceError> {
        self.weather
            .as_ref()
            .ok_or(ServiceError::MissingApiKey("openweathermap"))
    }

    fn news(&self) -> Result<&NewsClient, ServiceError> {
        self.news
            .as_ref()
            .ok_or(ServiceError::MissingApiKey("newsapi"))
    }

    fn chat(&self) -> Result<&ChatClient, ServiceError> {
        self.chat
            .as_ref()
            .ok_or(ServiceError::MissingApiKey("gemini"))
    }
}

impl CallWebServices for WebServiceRouter {
    fn call_web_service(
        &self,
        action_id: &ActionId,
        argument: Option<&str>,
    ) -> Result<String, ServiceError> {
        match action_id.as_str() {
            "open_google" => {
                open_in_browser(GOOGLE_URL)?;
                Ok("Google açılıyor".to_string())
            }
            "open_youtube" => {
                open_in_browser(YOUTUBE_URL)?;
                Ok("YouTube açılıyor".to_string())
            }
            "search_google" => {
                let query = required_argument(action_id, argument)?;
                open_in_browser(&google_search_url(query))?;
                Ok(format!("Google'da aranıyor: {query}"))
            }
            "weather_report" => {
                let city = argument.unwrap_or(DEFAULT_WEATHER_CITY);
                self.weather()?.fetch(city)
            }
            "top_headlines" => self.news()?.top_headlines(None),
            "search_news" => {
                let query = required_argument(action_id, argument)?;
                // A bare category word asks for that section's headlines;
                // anything else is a full-text search.
                match turkish_news_category(query) {
                    Some(category) => self.news()?.top_headlines(Some(category)),
                    None => self.news()?.search(query),
                }
            }
            "ai_chat" => {
                let prompt = required_argument(action_id, argument)?;
                self.chat()?.reply(prompt)
            }
            other => Err(ServiceError::UnknownAction(other.to_string())),
        }
    }
}

fn required_argument<'a>(
    action_id: &ActionId,
    argument: Option<&'a str>,
) -> Result<&'a str, ServiceError> {
    argument
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ServiceError::MissingArgument(action_id.as_str().to_string()))
}

fn open_in_browser(url: &str) -> Result<(), ServiceError> {
    webbrowser::open(url).map_err(|e| ServiceError::Transport(format!("tarayıcı açılamadı: {e}")))
}

fn google_search_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{GOOGLE_SEARCH_URL}{encoded}")
}

/// Turkish section words the original assistant understood, mapped onto the
/// NewsAPI category identifiers.
fn turkish_news_category(word: &str) -> Option<&'static str> {
    match word.trim() {
        "iş" => Some("business"),
        "eğlence" => Some("entertainment"),
        "sağlık" => Some("health"),
        "bilim" => Some("science"),
        "spor" => Some("sports"),
        "teknoloji" => Some("technology"),
        _ => None,
    }
}

fn provider_error(provider: &'static str, err: ureq::Error) -> ServiceError {
    match err {
        ureq::Error::Status(status, _) => ServiceError::Upstream { provider, status },
        ureq::Error::Transport(transport) => {
            ServiceError::Transport(format!("{provider}: {}", transport.kind()))
        }
    }
}

fn read_json(provider: &'static str, response: ureq::Response) -> Result<Value, ServiceError> {
    serde_json::from_reader(response.into_reader())
        .map_err(|_| ServiceError::MalformedResponse(provider))
}

struct WeatherClient {
    agent: ureq::Agent,
    api_key: String,
}

impl WeatherClient {
    fn new(agent: ureq::Agent, api_key: String) -> Self {
        Self { agent, api_key }
    }

    fn fetch(&self, city: &str) -> Result<String, ServiceError> {
        let response = self
            .agent
            .get(OPENWEATHER_URL)
            .query("q", city)
            .query("appid", &self.api_key)
            .query("lang", "tr")
            .query("units", "metric")
            .call()
            .map_err(|e| provider_error("openweathermap", e))?;
        let body = read_json("openweathermap", response)?;
        format_weather(&body).ok_or(ServiceError::MalformedResponse("openweathermap"))
    }
}

fn format_weather(body: &Value) -> Option<String> {
    let location = body.get("name")?.as_str()?;
    let condition = body
        .get("weather")?
        .as_array()?
        .first()?
        .get("description")?
        .as_str()?;
    let temperature = body.get("main")?.get("temp")?.as_f64()?;
    let humidity = body.get("main")?.get("humidity")?.as_f64()?;
    Some(format!(
        "{location} için hava {condition}, sıcaklık {temperature:.0} derece, nem yüzde {humidity:.0}"
    ))
}

struct NewsClient {
    agent: ureq::Agent,
    api_key: String,
}

impl NewsClient {
    fn new(agent: ureq::Agent, api_key: String) -> Self {
        Self { agent, api_key }
    }

    fn top_headlines(&self, category: Option<&str>) -> Result<String, ServiceError> {
        let mut request = self
            .agent
            .get(&format!("{NEWSAPI_BASE_URL}/top-headlines"))
            .query("apiKey", &self.api_key)
            .query("language", "tr")
            .query("pageSize", &MAX_HEADLINES.to_string());
        if let Some(category) = category {
            request = request.query("category", category);
        }
        let response = request.call().map_err(|e| provider_error("newsapi", e))?;
        let body = read_json("newsapi", response)?;
        format_headlines(&body).ok_or(ServiceError::MalformedResponse("newsapi"))
    }

    fn search(&self, query: &str) -> Result<String, ServiceError> {
        let response = self
            .agent
            .get(&format!("{NEWSAPI_BASE_URL}/everything"))
            .query("apiKey", &self.api_key)
            .query("language", "tr")
            .query("pageSize", &MAX_HEADLINES.to_string())
            .query("q", query)
            .call()
            .map_err(|e| provider_error("newsapi", e))?;
        let body = read_json("newsapi", response)?;
        format_headlines(&body).ok_or(ServiceError::MalformedResponse("newsapi"))
    }
}

fn format_headlines(body: &Value) -> Option<String> {
    let articles = body.get("articles")?.as_array()?;
    if articles.is_empty() {
        return Some("Şu anda gösterilecek haber bulunamadı".to_string());
    }
    let titles: Vec<&str> = articles
        .iter()
        .take(MAX_HEADLINES)
        .filter_map(|article| article.get("title")?.as_str())
        .collect();
    if titles.is_empty() {
        return None;
    }
    Some(format!("Günün başlıkları: {}", titles.join(". ")))
}

struct ChatClient {
    agent: ureq::Agent,
    api_key: String,
}

impl ChatClient {
    fn new(agent: ureq::Agent, api_key: String) -> Self {
        Self { agent, api_key }
    }

    fn reply(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": format!("{CHAT_PERSONA_PROMPT}\n\n{prompt}") }]
            }]
        });
        let response = self
            .agent
            .post(GEMINI_URL)
            .query("key", &self.api_key)
            .send_json(body)
            .map_err(|e| provider_error("gemini", e))?;
        let body = read_json("gemini", response)?;
        extract_chat_reply(&body).ok_or(ServiceError::MalformedResponse("gemini"))
    }
}

fn extract_chat_reply(body: &Value) -> Option<String> {
    let text = body
        .get("candidates")?
        .as_array()?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()?
        .trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}
