use sentry::{types::Dsn, SessionMode};
use std::{borrow::Cow, env, str::FromStr};
use tracing::warn;
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

pub fn setup() -> sentry::ClientInitGuard {
    let (dsn, invalid_dsn) = match env::var("SENTRY_DSN").map(|s| Dsn::from_str(&s)) {
        Ok(Ok(dsn)) => (Some(dsn), None),
        Ok(Err(err)) => (None, Some(err.to_string())),
        Err(_) => (None, None),
    };

    let guard = sentry::init(sentry::ClientOptions {
        traces_sample_rate: 1.0,
        attach_stacktrace: true,
        session_mode: SessionMode::Request,
        release: Some(Cow::Borrowed(env!("STATIC_BUILD_DATE"))),
        dsn,
        ..sentry::ClientOptions::default()
    });

    tracing_subscriber::registry()
        .with(sentry_tracing::layer())
        .with(
            tracing_subscriber::fmt::layer().with_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| "api=info,buddy=info".into()),
            ),
        )
        .init();

    if let Some(err) = invalid_dsn {
        warn!("Ignoring invalid $SENTRY_DSN: {err}");
    }

    guard
}
