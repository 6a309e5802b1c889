use super::types::{MaskRequest, SegmentationService, UploadedVideo};
use crate::error::{SmartcropError, SmartcropResult};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Foreground label for a point prompt
const LABEL_FOREGROUND: i32 = 1;

#[derive(Serialize)]
struct UploadBody<'a> {
    video_url: &'a str,
}

#[derive(Deserialize)]
struct UploadReply {
    video_id: String,
    total_frames: u64,
}

#[derive(Serialize)]
struct MaskBody<'a> {
    video_id: &'a str,
    frame_id: u64,
    points: Vec<[u32; 2]>,
    labels: Vec<i32>,
}

#[derive(Deserialize)]
struct MaskReply {
    mask_data: Vec<Vec<u8>>,
}

#[derive(Serialize)]
struct SmartcropBody<'a> {
    video_id: &'a str,
}

#[derive(Deserialize)]
struct SmartcropReply {
    smartcrop_url: String,
}

/// JSON-over-HTTP client for the segmentation / crop service
pub struct RemoteService {
    client: Client,
    base_url: String,
}

impl RemoteService {
    pub fn new(base_url: impl Into<String>) -> SmartcropResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(SmartcropError::service("service base address is empty"));
        }

        tracing::info!("Using segmentation service at {}", base_url);

        let client = Client::builder()
            .user_agent(concat!("smartcrop/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> SmartcropResult<R> {
        let url = self.endpoint(path);
        tracing::debug!("POST {}", url);

        let resp = self.client.post(&url).json(body).send()?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            return Err(SmartcropError::service(format!(
                "{path} returned {status}: {}",
                detail.trim()
            )));
        }

        resp.json::<R>()
            .map_err(|e| SmartcropError::service(format!("{path} returned a malformed body: {e}")))
    }
}

impl SegmentationService for RemoteService {
    fn upload_video(&self, video_url: &str) -> SmartcropResult<UploadedVideo> {
        let reply: UploadReply = self.post("upload_video", &UploadBody { video_url })?;
        Ok(UploadedVideo {
            video_id: reply.video_id,
            total_frames: reply.total_frames,
        })
    }

    fn get_mask(&self, request: &MaskRequest) -> SmartcropResult<Vec<Vec<u8>>> {
        let body = MaskBody {
            video_id: &request.video_id,
            frame_id: request.frame,
            points: vec![[request.point.x, request.point.y]],
            labels: vec![LABEL_FOREGROUND],
        };
        let reply: MaskReply = self.post("get_mask", &body)?;
        Ok(reply.mask_data)
    }

    fn get_smartcrop(&self, video_id: &str) -> SmartcropResult<String> {
        let reply: SmartcropReply = self.post("get_smartcrop", &SmartcropBody { video_id })?;
        Ok(reply.smartcrop_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PixelPoint;

    #[test]
    fn mask_body_carries_one_foreground_point() {
        let request = MaskRequest {
            video_id: "vid-1".to_owned(),
            frame: 60,
            point: PixelPoint::new(960, 540),
        };
        let body = MaskBody {
            video_id: &request.video_id,
            frame_id: request.frame,
            points: vec![[request.point.x, request.point.y]],
            labels: vec![LABEL_FOREGROUND],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "video_id": "vid-1",
                "frame_id": 60,
                "points": [[960, 540]],
                "labels": [1],
            })
        );
    }

    #[test]
    fn replies_decode_from_service_json() {
        let upload: UploadReply =
            serde_json::from_str(r#"{"video_id":"abc","total_frames":90}"#).unwrap();
        assert_eq!(upload.video_id, "abc");
        assert_eq!(upload.total_frames, 90);

        let mask: MaskReply = serde_json::from_str(r#"{"mask_data":[[0,1],[1]]}"#).unwrap();
        assert_eq!(mask.mask_data, vec![vec![0, 1], vec![1]]);

        let crop: SmartcropReply =
            serde_json::from_str(r#"{"smartcrop_url":"https://cdn/x.mp4"}"#).unwrap();
        assert_eq!(crop.smartcrop_url, "https://cdn/x.mp4");
    }

    #[test]
    fn base_url_is_normalised() {
        let service = RemoteService::new("http://localhost:8000/").unwrap();
        assert_eq!(
            service.endpoint("get_mask"),
            "http://localhost:8000/get_mask"
        );
        assert!(RemoteService::new("").is_err());
    }
}
