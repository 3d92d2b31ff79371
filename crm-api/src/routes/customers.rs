/// Customer endpoints
///
/// All operations are scoped to the requesting user; another user's customer
/// answers 404 exactly like a missing one.
///
/// - `GET /v1/customers?search=&status=&limit=&offset=`
/// - `POST /v1/customers`
/// - `GET /v1/customers/:id` (with tags and notes)
/// - `PATCH|PUT /v1/customers/:id`
/// - `DELETE /v1/customers/:id`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{double_option, SuccessResponse},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use crm_shared::{
    auth::middleware::AuthContext,
    models::{
        customer::{
            CreateCustomer, Customer, CustomerFilter, CustomerStatus, CustomerWithTags,
            UpdateCustomer,
        },
        note::{Note, NoteWithAuthor},
    },
    validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ListCustomersQuery {
    pub search: Option<String>,
    pub status: Option<CustomerStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListCustomersQuery {
    pub fn into_filter(self) -> CustomerFilter {
        CustomerFilter {
            search: validation::optional(self.search.as_deref()),
            status: self.status,
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub email: Option<String>,

    #[validate(length(max = 64, message = "Phone must be at most 64 characters"))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "Company must be at most 255 characters"))]
    pub company: Option<String>,

    pub status: Option<CustomerStatus>,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub email: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,

    pub status: Option<CustomerStatus>,
    pub tags: Option<Vec<String>>,
}

impl UpdateCustomerRequest {
    /// Validates and normalizes the provided fields
    pub fn into_update(self) -> ApiResult<UpdateCustomer> {
        self.validate()?;

        let name = match self.name {
            Some(name) => Some(validation::required("name", Some(name.as_str()))?),
            None => None,
        };
        let email = match self.email {
            Some(email) => Some(validation::contact_email("email", &email)?),
            None => None,
        };
        let phone = self.phone.map(|p| validation::optional(p.as_deref()));
        if let Some(Some(phone)) = &phone {
            validation::max_length("phone", phone, validation::MAX_PHONE_LEN)?;
        }
        let company = self.company.map(|c| validation::optional(c.as_deref()));
        if let Some(Some(company)) = &company {
            validation::max_length("company", company, validation::MAX_TEXT_LEN)?;
        }

        Ok(UpdateCustomer {
            name,
            email,
            phone,
            company,
            status: self.status,
            tags: self
                .tags
                .map(|t| validation::normalize_tags(&t))
                .transpose()?,
        })
    }
}

/// Customer detail: tags plus notes
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: CustomerWithTags,
    pub notes: Vec<NoteWithAuthor>,
}

pub async fn list_customers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListCustomersQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<CustomerWithTags>>> {
    let Query(query) = query?;
    let filter = query.into_filter();
    let customers = Customer::list_owned(&state.db, auth.user_id, &filter).await?;
    Ok(Json(customers))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CustomerWithTags>)> {
    let Json(req) = payload?;
    req.validate()?;

    let name = validation::required("name", req.name.as_deref())?;
    let email = validation::required("email", req.email.as_deref())?;
    let email = validation::contact_email("email", &email)?;

    let created = Customer::create(
        &state.db,
        CreateCustomer {
            user_id: auth.user_id,
            name,
            email,
            phone: validation::optional(req.phone.as_deref()),
            company: validation::optional(req.company.as_deref()),
            status: req.status.unwrap_or_default(),
            tags: validation::normalize_tags(&req.tags)?,
        },
    )
    .await?;

    tracing::info!(
        customer_id = %created.customer.id,
        user_id = %auth.user_id,
        tags = created.tags.len(),
        "Customer created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<CustomerDetail>> {
    let Path(id) = id?;
    let customer = Customer::find_owned_with_tags(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))?;

    let notes = Note::list_for_customer(&state.db, id).await?;

    Ok(Json(CustomerDetail { customer, notes }))
}

/// Serves both PATCH and PUT; only fields present in the body change
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateCustomerRequest>, JsonRejection>,
) -> ApiResult<Json<CustomerWithTags>> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let update = req.into_update()?;

    let updated = Customer::update_owned(&state.db, id, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))?;

    tracing::info!(customer_id = %id, user_id = %auth.user_id, "Customer updated");

    Ok(Json(updated))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Path(id) = id?;
    if !Customer::delete_owned(&state.db, id, auth.user_id).await? {
        return Err(ApiError::not_found("Customer"));
    }

    tracing::info!(customer_id = %id, user_id = %auth.user_id, "Customer deleted");

    Ok(Json(SuccessResponse::ok()))
}
