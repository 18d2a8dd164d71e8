use axum::extract::State;

use crate::db::{AppState, queries};
use crate::error::{OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::models::Widget;

pub async fn get_widget(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Widget>> {
    let conn = state.db.get()?;
    let widget = queries::get_widget_by_id(&conn, id)?.or_not_found(msg::WIDGET_NOT_FOUND)?;
    Ok(Json(widget))
}
