//! Basic example of the Objar service container.

use std::sync::Arc;

use objar::prelude::*;
use objar::telemetry::init_tracing;

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

#[derive(Clone)]
struct Config {
    database_url: String,
}

struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserService {
    db: Arc<Database>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

struct InfrastructureProvider;

impl Provider for InfrastructureProvider {
    fn register(&self, container: &Container) -> Result<()> {
        container
            .define_value(
                "config",
                Config {
                    database_url: "postgres://localhost/myapp".to_string(),
                },
            )?
            .define("logger", |_| Ok(Some(Arc::new(ConsoleLogger) as Arc<dyn Logger>)))?
            .define("db", |c| {
                let config = c.resolve_as::<Config>("config")?;
                let logger = c.resolve_as::<Arc<dyn Logger>>("logger")?;
                Ok(Some(Database {
                    url: config.database_url.clone(),
                    logger: (*logger).clone(),
                }))
            })?;
        Ok(())
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_tracing("objar=debug")?;

    let container = Container::builder()
        .add_provider(InfrastructureProvider)
        .build()?;

    container
        .define("users", |c| {
            let db = c.resolve_as::<Database>("db")?;
            Ok(Some(UserService { db }))
        })?
        // deliberately broken pair
        .define("ping", |c| {
            c.resolve("pong")?;
            Ok(Some("ping"))
        })?
        .define("pong", |c| {
            c.resolve("ping")?;
            Ok(Some("pong"))
        })?;

    println!("{container:?}");

    let users = container.resolve_as::<UserService>("users")?;
    println!("{}", users.get_user(42));

    let greeting = container.invoke(vec![
        "config".into(),
        "users".into(),
        Annotation::call(|args| {
            let config = args[0].downcast_ref::<Config>().map(|c| c.database_url.clone());
            format!("invoked with {} services, db = {config:?}", args.len())
        }),
    ])?;
    println!("{greeting}");

    if let Err(err) = container.resolve("ping") {
        println!("{err}");
    }

    println!("{}", describe(&container.snapshot()));
    Ok(())
}

fn describe(snapshot: &ContainerSnapshot) -> String {
    format!(
        "defined={:?} resolved={:?} stuck={:?}",
        snapshot.defined,
        snapshot.resolved,
        snapshot.stuck()
    )
}
