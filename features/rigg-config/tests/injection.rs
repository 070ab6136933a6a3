use std::sync::Arc;

use rigg_config::{Config, ConfigProvider};
use rigg_di::{
    Arguments, Constructable, ContainerBuilder, DependencyGraphError, DynError, Parameter,
    Registration, ServiceKey,
};

struct HttpConfig {
    port: u16,
    verbose: bool,
}

struct HttpServer {
    port: u16,
    verbose: bool,
}

impl Constructable for HttpServer {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::required::<Config<HttpConfig>>("config")]
    }

    fn construct(args: &mut Arguments) -> Result<Self, DynError> {
        let config: Config<HttpConfig> = args.take("config")?;
        Ok(HttpServer {
            port: config.port,
            verbose: config.verbose,
        })
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn constructors_receive_configs() {
    init_logging();
    let mut provider = ConfigProvider::new();
    provider
        .add_config(HttpConfig {
            port: 3000,
            verbose: true,
        })
        .unwrap();

    let container = ContainerBuilder::new()
        .add_instance(Arc::new(provider))
        .add_registration(Registration::constructor::<HttpServer>())
        .build()
        .unwrap();

    let server = container.resolve::<HttpServer>().unwrap();
    assert_eq!(server.port, 3000);
    assert!(server.verbose);
}

#[test]
fn validation_requires_an_installed_provider() {
    let errors = ContainerBuilder::new()
        .add_registration(Registration::constructor::<HttpServer>())
        .build()
        .err()
        .unwrap()
        .errors;

    assert!(matches!(
        &errors[0],
        DependencyGraphError::MissingDependency { dependency, .. }
            if dependency == &ServiceKey::of::<ConfigProvider>()
    ));
}
