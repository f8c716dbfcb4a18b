mod segment;

#[cfg(unix)]
mod support;
