//! Upstream publishing of poll snapshots.

use core::time::Duration;

use crate::ambient::AmbientReading;

/// Values collected in one poll cycle. A field is `None` when its source
/// failed during that cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    pub orp: Option<f32>,
    pub ph: Option<f32>,
    pub co2: Option<f32>,
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
}

impl Snapshot {
    pub fn set_ambient(&mut self, reading: &AmbientReading) {
        self.co2 = Some(reading.co2_ppm);
        self.temperature = Some(reading.temperature_c);
        self.humidity = Some(reading.humidity_pct);
    }

    /// Channel fields in upload order, empty ones left out.
    pub fn fields(&self) -> Vec<(&'static str, f32)> {
        [
            ("field1", self.orp),
            ("field2", self.ph),
            ("field3", self.co2),
            ("field4", self.temperature),
            ("field5", self.humidity),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("could not read response body: {0}")]
    Body(#[from] std::io::Error),
    /// ThingSpeak answers `0` when it drops an update (bad key, rate limit).
    #[error("update rejected by channel")]
    Rejected,
}

/// Port for sending a snapshot upstream.
pub trait Publisher {
    type Error: core::fmt::Display;

    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;
}

/// ThingSpeak channel update over HTTPS.
pub struct ThingSpeak {
    agent: ureq::Agent,
    url: String,
    api_key: String,
}

impl ThingSpeak {
    pub const DEFAULT_URL: &'static str = "https://api.thingspeak.com/update";

    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        ThingSpeak {
            agent,
            url: url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn form(&self, snapshot: &Snapshot) -> Vec<(&'static str, String)> {
        let mut form = vec![("api_key", self.api_key.clone())];
        form.extend(
            snapshot
                .fields()
                .into_iter()
                .map(|(name, value)| (name, value.to_string())),
        );
        form
    }
}

impl Publisher for ThingSpeak {
    type Error = PublishError;

    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), PublishError> {
        if snapshot.is_empty() {
            log::debug!("thingspeak: nothing to publish");
            return Ok(());
        }
        let form = self.form(snapshot);
        let pairs: Vec<(&str, &str)> = form.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response = self
            .agent
            .post(&self.url)
            .send_form(&pairs)
            .map_err(Box::new)?;
        let body = response.into_string()?;

        // The body is the new entry id, or 0 when the update was dropped
        if body.trim() == "0" {
            return Err(PublishError::Rejected);
        }
        log::debug!("thingspeak: entry {}", body.trim());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Local HTTP endpoint that answers one request with `body`. The handle
    /// yields the form it received.
    fn serve_once(body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/update", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut form = vec![0u8; content_length];
            reader.read_exact(&mut form).unwrap();

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 200 OK\r\n\
                 Content-Type: text/plain\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .unwrap();
            String::from_utf8(form).unwrap()
        });
        (url, handle)
    }

    #[test]
    fn test_fields_mapping_and_order() {
        let mut snap = Snapshot { orp: Some(225.4), ph: Some(7.02), ..Default::default() };
        snap.set_ambient(&AmbientReading {
            co2_ppm: 612.0,
            temperature_c: 22.5,
            humidity_pct: 45.0,
        });
        assert_eq!(
            snap.fields(),
            vec![
                ("field1", 225.4),
                ("field2", 7.02),
                ("field3", 612.0),
                ("field4", 22.5),
                ("field5", 45.0),
            ]
        );
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let snap = Snapshot { ph: Some(6.5), humidity: Some(50.0), ..Default::default() };
        assert_eq!(snap.fields(), vec![("field2", 6.5), ("field5", 50.0)]);
        assert!(Snapshot::default().is_empty());
    }

    #[test]
    fn test_form_includes_key() {
        let ts = ThingSpeak::new(ThingSpeak::DEFAULT_URL, "KEY", Duration::from_secs(1));
        let form = ts.form(&Snapshot { orp: Some(1.5), ..Default::default() });
        assert_eq!(
            form,
            vec![("api_key", "KEY".to_string()), ("field1", "1.5".to_string())]
        );
    }

    #[test]
    fn test_empty_snapshot_not_sent() {
        // unroutable URL: publish must return before any request is made
        let mut ts = ThingSpeak::new("http://127.0.0.1:9/update", "KEY", Duration::from_millis(10));
        assert!(ts.publish(&Snapshot::default()).is_ok());
    }

    #[test]
    fn test_publish_posts_form() {
        let (url, server) = serve_once("42");
        let mut ts = ThingSpeak::new(&url, "KEY", Duration::from_secs(5));
        let snap = Snapshot {
            orp: Some(1.5),
            ph: Some(7.0),
            ..Default::default()
        };

        assert!(ts.publish(&snap).is_ok());

        let form = server.join().unwrap();
        assert_eq!(form, "api_key=KEY&field1=1.5&field2=7");
    }

    #[test]
    fn test_publish_zero_body_is_rejected() {
        let (url, server) = serve_once("0");
        let mut ts = ThingSpeak::new(&url, "KEY", Duration::from_secs(5));
        let snap = Snapshot {
            co2: Some(612.0),
            ..Default::default()
        };

        assert!(matches!(ts.publish(&snap), Err(PublishError::Rejected)));
        assert_eq!(server.join().unwrap(), "api_key=KEY&field3=612");
    }
}
