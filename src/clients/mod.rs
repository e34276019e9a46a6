pub mod dispatcher;
pub mod ses;
pub mod sns;
pub mod template;
