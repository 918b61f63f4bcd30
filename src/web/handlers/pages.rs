// Page handlers for HTML rendering with Askama

use crate::api_server::{AppError, AppState};
use crate::generator::random_sections;
use crate::repository::CardFilter;
use crate::web::view_models::{
    form_fields, CardDetail, CardSummary, KindView, SelectOption,
};
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use std::collections::{BTreeMap, HashMap};

/// Message shown whenever a stored card fails type validation
pub const CANNOT_DISPLAY: &str = "cannot display that";

fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Internal(format!("Template error: {}", e)))
}

// ============================================================================
// Index Page
// ============================================================================

/// Query string for `GET /`; blank values mean "no filter"
#[derive(Debug, Default, serde::Deserialize)]
pub struct IndexQuery {
    pub card_type: Option<String>,
    pub account_id: Option<String>,
    pub reference_date: Option<String>,
}

impl IndexQuery {
    pub fn into_filter(self) -> CardFilter {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        CardFilter {
            card_type: non_blank(self.card_type),
            account_id: non_blank(self.account_id),
            reference_date: non_blank(self.reference_date),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub cards: Vec<CardSummary>,
    pub total_count: usize,
    pub card_types: Vec<SelectOption>,
    pub reference_dates: Vec<SelectOption>,
    pub account_id: String,
}

pub async fn index_page(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let filter = query.into_filter();
    let lookup = filter.clone();
    let (cards, dates) = state
        .with_repository(move |repo| (repo.filter(&lookup), repo.reference_dates()))
        .await?;
    tracing::debug!("Index page: {} cards for {:?}", cards.len(), filter);

    let card_types = state
        .registry
        .kinds()
        .map(|k| SelectOption::new(k.tag, k.display_name, filter.card_type.as_deref()))
        .collect();

    let reference_dates = dates
        .iter()
        .map(|d| SelectOption::new(d, d, filter.reference_date.as_deref()))
        .collect();

    let template = IndexTemplate {
        title: "Report Card Interface".to_string(),
        total_count: cards.len(),
        cards: cards.iter().map(|c| CardSummary::new(c, &state.registry)).collect(),
        card_types,
        reference_dates,
        account_id: filter.account_id.clone().unwrap_or_default(),
    };
    render(&template)
}

// ============================================================================
// Show Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/show.html")]
pub struct ShowTemplate {
    pub title: String,
    pub card: CardDetail,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/not_found.html")]
pub struct NotFoundTemplate {
    pub title: String,
    pub key: String,
}

pub async fn show_page(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Response, AppError> {
    let key = uuid.clone();
    let card = match state.with_repository(move |repo| repo.get_by_uuid(&key)).await? {
        Some(card) => card,
        None => {
            tracing::debug!("Report card {} not found", uuid);
            let template = NotFoundTemplate {
                title: "Report Card Not Found".to_string(),
                key: uuid,
            };
            return Ok((StatusCode::NOT_FOUND, render(&template)?).into_response());
        }
    };

    // Unknown type and missing parameters both collapse to one message
    let error = match state.registry.check(&card.card_type, &card.parameters) {
        Ok(()) => None,
        Err(reason) => {
            tracing::debug!("Report card {} cannot be displayed: {}", card.uuid, reason);
            Some(CANNOT_DISPLAY.to_string())
        }
    };

    let detail = CardDetail::new(&card, &state.registry);
    let template = ShowTemplate {
        title: detail.type_name.clone(),
        card: detail,
        error,
    };
    Ok(render(&template)?.into_response())
}

// ============================================================================
// Create Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/create.html")]
pub struct CreateTemplate {
    pub title: String,
    pub kinds: Vec<KindView>,
    pub fields: Vec<String>,
}

pub async fn create_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let template = CreateTemplate {
        title: "Create Report Card".to_string(),
        kinds: state.registry.kinds().map(KindView::from).collect(),
        fields: form_fields(&state.registry),
    };
    render(&template)
}

/// Split submitted fields into the type tag and the card parameters
///
/// Every other submitted field is kept as-is, blanks included; only key
/// presence matters when a card is later displayed.
pub fn parse_create_form(
    mut form: HashMap<String, String>,
) -> Result<(String, BTreeMap<String, String>), AppError> {
    let card_type = form
        .remove("card_type")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("card_type is required".to_string()))?;

    Ok((card_type, form.into_iter().collect()))
}

pub async fn create_submit(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let (card_type, parameters) = parse_create_form(form)?;
    let sections = random_sections(&mut rand::thread_rng());

    let card = state
        .with_repository(move |repo| repo.create(&card_type, parameters, sections))
        .await?
        .map_err(|e| AppError::Storage(e.to_string()))?;

    tracing::info!("Created {} report card {}", card.card_type, card.uuid);
    Ok(Redirect::to("/"))
}
