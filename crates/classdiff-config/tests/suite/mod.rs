mod loading;
mod tracing_init;
