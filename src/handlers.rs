use crate::dashboard::Event;
use crate::errors::AppError;
use crate::models::{CountryQuery, DashboardView, NoticeScope, SelectRequest};
use crate::state::AppState;
use crate::stats::build_view;
use crate::ui::render_index;
use axum::{
    Form, Json,
    extract::{Query, State},
    response::{Html, Redirect},
};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.snapshot().await;
    Html(render_index(&build_view(&snapshot), &snapshot.countries))
}

pub async fn get_countries(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> Json<Vec<String>> {
    let countries = state.snapshot().await.countries;
    let term = query.q.unwrap_or_default().trim().to_lowercase();
    if term.is_empty() {
        return Json(countries);
    }
    Json(
        countries
            .into_iter()
            .filter(|country| country.to_lowercase().contains(&term))
            .collect(),
    )
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(build_view(&state.snapshot().await))
}

pub async fn select(
    State(state): State<AppState>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<DashboardView>, AppError> {
    apply_selection(&state, payload).await?;
    Ok(Json(build_view(&state.snapshot().await)))
}

pub async fn select_form(
    State(state): State<AppState>,
    Form(payload): Form<SelectRequest>,
) -> Result<Redirect, AppError> {
    apply_selection(&state, payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn retry(State(state): State<AppState>) -> Json<DashboardView> {
    let current = state.snapshot().await;
    match current.error.map(|notice| notice.scope) {
        Some(NoticeScope::Countries) => load_countries(&state).await,
        _ => load_series(&state, current.selected).await,
    }
    Json(build_view(&state.snapshot().await))
}

async fn apply_selection(state: &AppState, payload: SelectRequest) -> Result<(), AppError> {
    let country = payload
        .country
        .map(|country| country.trim().to_string())
        .filter(|country| !country.is_empty());

    if let Some(country) = &country {
        if !state.snapshot().await.is_known_country(country) {
            return Err(AppError::bad_request(format!("unknown country '{country}'")));
        }
    }

    if let Some(range) = payload.range {
        state.dispatch(Event::RangeSelected(range)).await;
    }

    if let Some(country) = country {
        load_series(state, country).await;
    }
    Ok(())
}

pub async fn load_countries(state: &AppState) {
    state.dispatch(Event::CountriesRequested).await;
    let outcome = state.sources.countries().await;
    state.dispatch(Event::CountriesLoaded(outcome)).await;
}

/// Fetches `country` and hands the result back tagged with the request
/// number issued for it, so a slower earlier request cannot win.
pub async fn load_series(state: &AppState, country: String) {
    info!(%country, "loading series");
    let request = state
        .dispatch(Event::CountrySelected(country.clone()))
        .await
        .latest_request;
    let outcome = state.sources.series(&country).await;
    state.dispatch(Event::SeriesLoaded { request, outcome }).await;
}
