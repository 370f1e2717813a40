use std::time::Duration;

use serde::de::DeserializeOwned;

use super::types::{GeocodeResponse, PlacesResponse};
use super::MapsError;
use crate::hospitals::{NearbyOutcome, PlacesSearch};
use crate::location::{GeocodeOutcome, Geocoder};
use crate::models::GeoPoint;

/// Extra attempts after the first one, for retryable failures only.
const MAX_RETRIES: u32 = 2;
const BASE_BACKOFF_MS: u64 = 250;

/// Place type requested from the nearby-search endpoint.
const PLACE_TYPE_HOSPITAL: &str = "hospital";

/// Blocking HTTP client for the geocoding and nearby-search endpoints.
///
/// Must be built outside an async runtime and called from
/// `spawn_blocking` when used by the server.
pub struct MapsClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl MapsClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, MapsError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapsError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, MapsError> {
        let mut attempt = 0;
        loop {
            match self.get_json_once(path, params) {
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS << attempt);
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        "Maps request failed, retrying"
                    );
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, MapsError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                MapsError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                MapsError::Timeout(self.timeout_secs)
            } else {
                MapsError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MapsError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| MapsError::ResponseParsing(e.to_string()))
    }
}

impl Geocoder for MapsClient {
    fn geocode(&self, address: &str) -> Result<GeocodeOutcome, MapsError> {
        let parsed: GeocodeResponse =
            self.get_json("geocode/json", &[("address", address.to_string())])?;

        Ok(GeocodeOutcome {
            status: parsed.status,
            points: parsed
                .results
                .into_iter()
                .map(|entry| entry.geometry.location.into())
                .collect(),
            error_message: parsed.error_message,
        })
    }
}

impl PlacesSearch for MapsClient {
    fn nearby_hospitals(
        &self,
        point: GeoPoint,
        radius_meters: u32,
    ) -> Result<NearbyOutcome, MapsError> {
        let parsed: PlacesResponse = self.get_json(
            "place/nearbysearch/json",
            &[
                ("location", point.to_query_string()),
                ("radius", radius_meters.to_string()),
                ("type", PLACE_TYPE_HOSPITAL.to_string()),
            ],
        )?;

        Ok(NearbyOutcome {
            status: parsed.status,
            places: parsed.results.into_iter().map(Into::into).collect(),
            error_message: parsed.error_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve `responses` in order, one per connection, and report each
    /// request line back over the channel.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = [0u8; 4096];
                let n = stream.read(&mut buf).unwrap();
                let request = String::from_utf8_lossy(&buf[..n]);
                let line = request.lines().next().unwrap_or_default().to_string();
                tx.send(line).unwrap();

                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });

        (format!("http://{addr}"), rx)
    }

    fn client(base_url: &str) -> MapsClient {
        MapsClient::new(base_url, Some("test-key".into()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn trims_trailing_slash() {
        let c = client("http://maps.local/api/");
        assert_eq!(c.base_url, "http://maps.local/api");
        assert_eq!(c.timeout_secs, 5);
    }

    #[test]
    fn geocode_parses_points_and_sends_key() {
        let (url, requests) = serve(vec![(
            200,
            r#"{"status":"OK","results":[{"geometry":{"location":{"lat":34.05,"lng":-118.24}}}]}"#,
        )]);
        let outcome = client(&url).geocode("Los Angeles").unwrap();

        assert_eq!(outcome.status, "OK");
        assert_eq!(outcome.points, vec![GeoPoint::new(34.05, -118.24)]);
        let line = requests.recv().unwrap();
        assert!(line.starts_with("GET /geocode/json?"), "{line}");
        assert!(line.contains("address=Los+Angeles"), "{line}");
        assert!(line.contains("key=test-key"), "{line}");
    }

    #[test]
    fn nearby_search_maps_places() {
        let (url, requests) = serve(vec![(
            200,
            r#"{"status":"OK","results":[{"name":"General","vicinity":"1 Main St","place_id":"p1","geometry":{"location":{"lat":1.0,"lng":2.0}}}]}"#,
        )]);
        let outcome = client(&url)
            .nearby_hospitals(GeoPoint::new(1.0, 2.0), 5000)
            .unwrap();

        assert_eq!(outcome.places.len(), 1);
        assert_eq!(outcome.places[0].address, "1 Main St");
        assert_eq!(outcome.places[0].place_id.as_deref(), Some("p1"));
        let line = requests.recv().unwrap();
        assert!(line.contains("radius=5000"), "{line}");
        assert!(line.contains("type=hospital"), "{line}");
    }

    #[test]
    fn non_ok_status_is_passed_through() {
        let (url, _requests) = serve(vec![(
            200,
            r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#,
        )]);
        let outcome = client(&url).geocode("x").unwrap();
        assert_eq!(outcome.status, "REQUEST_DENIED");
        assert_eq!(outcome.error_message.as_deref(), Some("bad key"));
        assert!(outcome.points.is_empty());
    }

    #[test]
    fn http_error_is_not_retried() {
        let (url, requests) = serve(vec![(500, "boom"), (200, r#"{"status":"OK"}"#)]);
        let err = client(&url).geocode("x").unwrap_err();
        assert!(matches!(err, MapsError::Http { status: 500, .. }));
        assert!(requests.recv().is_ok());
        assert!(requests
            .recv_timeout(Duration::from_millis(300))
            .is_err());
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let (url, _requests) = serve(vec![(200, "not json")]);
        let err = client(&url).geocode("x").unwrap_err();
        assert!(matches!(err, MapsError::ResponseParsing(_)));
    }

    #[test]
    fn unreachable_host_is_connection_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = client(&format!("http://127.0.0.1:{port}"))
            .geocode("x")
            .unwrap_err();
        assert!(matches!(err, MapsError::Connection(_)));
        assert!(err.is_retryable());
    }
}
