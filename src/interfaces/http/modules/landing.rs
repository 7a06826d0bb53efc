//! Landing page at `/`

use axum::{extract::State, response::Html};

#[derive(Clone)]
pub struct LandingState {
    pub telemetry_path: String,
}

pub async fn index(State(state): State<LandingState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>AWS RDS Exporter</title></head>\n\
         <body>\n\
         <h1>AWS RDS Exporter</h1>\n\
         <p><a href='{path}'>Metrics</a></p>\n\
         <p>Version {version}</p>\n\
         </body>\n\
         </html>\n",
        path = state.telemetry_path,
        version = env!("CARGO_PKG_VERSION"),
    ))
}
