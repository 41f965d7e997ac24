//! Environment source: `DRUI_<SECTION>__<OPTION>`, e.g. `DRUI_REGISTRY__ENDPOINT`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "DRUI";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("ui.official_prefix")
            .with_list_parse_key("ui.verified_prefix"),
    )
}
