use std::error::Error;
use std::sync::Arc;

use flow_forecast_service::api::{self, AppState};
use flow_forecast_service::config::Config;
use flow_forecast_service::forecast::EtsModel;
use flow_forecast_service::ingest::usgs::UsgsClient;
use flow_forecast_service::logging::DataSource;
use flow_forecast_service::pipeline::ForecastPipeline;

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let logger = config.logger();

    logger.info(
        DataSource::System,
        None,
        &format!("Starting Flow Forecast API (log level {})", config.level()),
    );

    // reqwest's blocking client owns its own runtime and must be created
    // and dropped outside of tokio.
    let client = UsgsClient::new(&config.usgs, logger.clone())?;
    logger.info(
        DataSource::System,
        None,
        &format!("USGS daily values endpoint: {}", client.base_url()),
    );

    let pipeline = Arc::new(ForecastPipeline::new(
        Arc::new(client),
        Arc::new(EtsModel),
        logger.clone(),
    ));
    let state = AppState::new(Arc::clone(&pipeline), logger.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    let served = runtime.block_on(api::serve(&config, state));
    drop(runtime);
    drop(pipeline);

    if let Err(e) = served {
        logger.error(DataSource::System, None, &format!("Server stopped: {}", e));
        return Err(e.into());
    }
    Ok(())
}
