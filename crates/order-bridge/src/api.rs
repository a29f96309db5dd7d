//! Transport-agnostic HTTP surface.
//!
//! Each operation takes the raw `Authorization` value plus a request body and returns the
//! status code and body a web layer would send. Routing and socket handling live elsewhere.
//!
//! | Operation | Success | Errors |
//! |-----------|---------|--------|
//! | `create_product` | 201 | 400 validation, 401 |
//! | `list_products` | 200 | 401 |
//! | `get_product` | 200 | 404, 401 |
//! | `create_order` | 201 (`completed`, `failed` or `pending`) | 400 invalid product, 500 broker, 401 |
//! | `get_order` | 200 | 404, 401 |

use crate::auth::{AuthError, Principal, TokenVerifier};
use crate::clients::ProductClient;
use crate::model::{OrderId, OrderView, Product, ProductCreate, ProductId};
use crate::product_actor::ProductError;
use crate::service::{OrderService, OrderServiceError};
use resource_actor::ActorClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Body of `POST /orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub ids: Vec<ProductId>,
}

/// A successful reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiReply<T> {
    pub status: u16,
    pub body: T,
}

impl<T> ApiReply<T> {
    fn ok(body: T) -> Self {
        Self { status: 200, body }
    }

    fn created(body: T) -> Self {
        Self { status: 201, body }
    }
}

/// A failed reply. Serializes as `{"message": ...}`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl Serialize for ApiError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let message = self.to_string();
        ErrorBody { message: &message }.serialize(serializer)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<ProductError> for ApiError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::Validation(msg) => ApiError::BadRequest(msg),
            ProductError::InvalidProduct(_) => ApiError::BadRequest(e.to_string()),
            ProductError::NotFound(_) => ApiError::NotFound(e.to_string()),
            ProductError::ActorCommunicationError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<OrderServiceError> for ApiError {
    fn from(e: OrderServiceError) -> Self {
        match e {
            OrderServiceError::InvalidProduct(_) => ApiError::BadRequest(e.to_string()),
            OrderServiceError::NotFound(_) => ApiError::NotFound(e.to_string()),
            OrderServiceError::BrokerUnavailable(_) | OrderServiceError::Internal(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

type ApiResult<T> = Result<ApiReply<T>, ApiError>;

#[derive(Clone)]
pub struct Api {
    verifier: Arc<dyn TokenVerifier>,
    products: ProductClient,
    orders: OrderService,
}

impl Api {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        products: ProductClient,
        orders: OrderService,
    ) -> Self {
        Self {
            verifier,
            products,
            orders,
        }
    }

    fn authorize(&self, credential: Option<&str>) -> Result<Principal, ApiError> {
        self.verifier.verify(credential).map_err(|e| {
            warn!(error = %e, "Rejected request");
            ApiError::from(e)
        })
    }

    pub async fn create_product(
        &self,
        credential: Option<&str>,
        body: ProductCreate,
    ) -> ApiResult<Product> {
        self.authorize(credential)?;
        Ok(ApiReply::created(self.products.create_product(body).await?))
    }

    pub async fn list_products(&self, credential: Option<&str>) -> ApiResult<Vec<Product>> {
        self.authorize(credential)?;
        Ok(ApiReply::ok(self.products.list().await?))
    }

    pub async fn get_product(&self, credential: Option<&str>, id: &str) -> ApiResult<Product> {
        self.authorize(credential)?;
        Ok(ApiReply::ok(
            self.products.get_product(ProductId::from(id)).await?,
        ))
    }

    pub async fn create_order(
        &self,
        credential: Option<&str>,
        body: CreateOrderRequest,
    ) -> ApiResult<OrderView> {
        let principal = self.authorize(credential)?;
        Ok(ApiReply::created(
            self.orders.create_order(body.ids, &principal).await?,
        ))
    }

    pub async fn get_order(&self, credential: Option<&str>, id: &str) -> ApiResult<OrderView> {
        let principal = self.authorize(credential)?;
        Ok(ApiReply::ok(
            self.orders
                .get_order_status(OrderId::from(id), &principal)
                .await?,
        ))
    }
}
