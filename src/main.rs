use folks_service::api;
use folks_service::common::init;
use folks_service::settings::AppSettings;
use folks_service::workers::push_worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings);
    match settings.app_component.as_str() {
        "api" => api::serve(settings).await,
        "push-worker" => push_worker::serve(settings).await,
        other => anyhow::bail!("unknown app component: {other}"),
    }
}
