//! Registry trait for self-registering implementations.

/// Base trait for implementation registries.
///
/// Each pluggable implementation (currently the transports) provides a
/// `Registry` struct implementing this trait, tying the name used in
/// configuration files to the factory that builds the implementation.
pub trait ImplementationRegistry {
	/// The key used in configuration, for example `"jsonrpc"` for
	/// `[transport.implementations.jsonrpc]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	fn factory() -> Self::Factory;
}
