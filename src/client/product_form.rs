//! Seller "add product" form: fields, media collection and ordering, and
//! submission.

use reqwest::multipart::{Form, Part};

use crate::client::session::SessionCache;
use crate::client::{body_message, decode_field, read_json, ClientConfig, ClientError};
use crate::models::media::{auto_arrange, Direction, MediaItem, MediaKind, MediaOrder};
use crate::models::product::{CreateProductRequest, Product};

pub const CATEGORIES: [&str; 9] = [
    "fashion",
    "electronic",
    "furniture",
    "kitchen",
    "toys",
    "cosmetic",
    "food",
    "sports",
    "appliances",
];

const UPLOAD_PATH: &str = "/api/upload";
const CREATE_PATH: &str = "/api/sellers/products/with-stock";

pub struct ProductForm {
    http: reqwest::Client,
    config: ClientConfig,
    session: SessionCache,
    name: String,
    category: String,
    description: String,
    stock: String,
    price: String,
    delivery: String,
    images: Vec<String>,
    videos: Vec<String>,
    order: MediaOrder,
}

impl ProductForm {
    pub fn new(config: ClientConfig, session: SessionCache) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session,
            name: String::new(),
            category: String::new(),
            description: String::new(),
            stock: String::new(),
            price: String::new(),
            delivery: String::new(),
            images: Vec::new(),
            videos: Vec::new(),
            order: MediaOrder::auto(),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn set_stock(&mut self, stock: &str) {
        self.stock = stock.to_string();
    }

    pub fn set_price(&mut self, price: &str) {
        self.price = price.to_string();
    }

    pub fn set_delivery(&mut self, delivery: &str) {
        self.delivery = delivery.to_string();
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn videos(&self) -> &[String] {
        &self.videos
    }

    pub fn media_order(&self) -> &[MediaItem] {
        self.order.items()
    }

    pub fn is_auto_arrange(&self) -> bool {
        self.order.is_auto()
    }

    pub fn add_image(&mut self, url: &str) {
        self.add_media(MediaKind::Image, url);
    }

    pub fn add_video(&mut self, url: &str) {
        self.add_media(MediaKind::Video, url);
    }

    fn add_media(&mut self, kind: MediaKind, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        match kind {
            MediaKind::Image => self.images.push(url.to_string()),
            MediaKind::Video => self.videos.push(url.to_string()),
        }
        self.order.sync(&self.images, &self.videos);
    }

    pub fn set_auto_arrange(&mut self, enabled: bool) {
        self.order.set_auto_arrange(enabled, &self.images, &self.videos);
    }

    /// Drag-and-drop reorder. Only meaningful in manual mode.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        !self.order.is_auto() && self.order.move_item(from, to)
    }

    pub fn shift(&mut self, idx: usize, direction: Direction) -> bool {
        !self.order.is_auto() && self.order.shift(idx, direction)
    }

    /// Drop the item shown at `idx` from the order and from its source list.
    pub fn remove_at(&mut self, idx: usize) -> Option<MediaItem> {
        let item = self.order.items().get(idx).cloned()?;
        match item.kind {
            MediaKind::Image => self.images.retain(|u| u != &item.url),
            MediaKind::Video => self.videos.retain(|u| u != &item.url),
        }
        if !self.order.is_auto() {
            self.order.remove_at(idx);
        }
        self.order.sync(&self.images, &self.videos);
        Some(item)
    }

    /// Send a file to the upload endpoint and return its public URL.
    pub async fn upload_file(
        &self,
        data: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<String, ClientError> {
        let part = Part::bytes(data).file_name(file_name.to_string()).mime_str(mime)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.config.endpoint(UPLOAD_PATH)?)
            .multipart(form)
            .send()
            .await?;
        let body = read_json(response, "Upload failed. Try again.").await?;

        ["url", "secure_url"]
            .iter()
            .filter_map(|key| body.get(*key).and_then(|v| v.as_str()))
            .find(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ClientError::Decode(body_message(&body).unwrap_or_else(|| "missing `url`".into()))
            })
    }

    /// Upload and append in one step.
    pub async fn upload_media(
        &mut self,
        kind: MediaKind,
        data: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<String, ClientError> {
        let url = self.upload_file(data, file_name, mime).await?;
        self.add_media(kind, &url);
        Ok(url)
    }

    /// Build the request body, stopping at the first problem.
    pub fn validate(&self) -> Result<CreateProductRequest, ClientError> {
        let seller_id = match (self.session.token(), self.session.user_id()) {
            (Some(_), Some(id)) if !id.is_empty() => id,
            _ => return Err(ClientError::validation("Login required.")),
        };

        let media_order = if self.order.is_auto() {
            auto_arrange(&self.images, &self.videos)
        } else {
            self.order.items().to_vec()
        };

        let image = self
            .images
            .first()
            .cloned()
            .or_else(|| {
                media_order
                    .iter()
                    .find(|m| m.kind == MediaKind::Image)
                    .map(|m| m.url.clone())
            })
            .unwrap_or_default();

        let raw_stock = self.stock.trim();
        let fractional_stock = raw_stock.parse::<i64>().is_err()
            && raw_stock.parse::<f64>().map_or(false, |n| n.is_finite() && n > 0.0);

        let request = CreateProductRequest {
            name: self.name.trim().to_string(),
            category: self.category.clone(),
            description: self.description.clone(),
            // A positive fraction passes `check` so earlier fields are reported first.
            stock: if fractional_stock { 1 } else { raw_stock.parse().unwrap_or(0) },
            price: self.price.trim().parse().unwrap_or(f64::NAN),
            image,
            images: self.images.clone(),
            videos: self.videos.clone(),
            delivery: self.delivery.clone(),
            seller_id: Some(seller_id),
            media_order,
        };

        request.check().map_err(ClientError::validation)?;
        if fractional_stock {
            return Err(ClientError::validation("Stock must be a whole number."));
        }
        if !CATEGORIES.contains(&request.category.as_str()) {
            return Err(ClientError::validation("Please choose a category from the list."));
        }
        Ok(request)
    }

    /// Create the product. An expired login (401) signs the seller out.
    pub async fn submit(&self) -> Result<Product, ClientError> {
        let request = self.validate()?;
        let token = self.session.token().unwrap_or_default();

        let response = self
            .http
            .post(self.config.endpoint(CREATE_PATH)?)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        match read_json(response, "Submit failed.").await {
            Ok(body) => decode_field(&body, "product"),
            Err(err) => {
                if err.is_unauthorized() {
                    tracing::warn!("🔒 Session rejected, signing out");
                    self.session.clear()?;
                }
                Err(err)
            }
        }
    }
}
