use std::sync::LazyLock;

use i18n_embed::{
	DesktopLanguageRequester,
	fluent::{FluentLanguageLoader, fluent_language_loader},
};
use rust_embed::RustEmbed;
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "i18n"]
struct Localizations;

static LOADER: LazyLock<FluentLanguageLoader> = LazyLock::new(|| fluent_language_loader!());

pub fn loader() -> &'static FluentLanguageLoader {
	&LOADER
}

/// Select the UI language. A configured locale wins over the desktop's.
pub fn init(forced_locale: Option<&str>) {
	let requested = match forced_locale {
		Some(tag) => match tag.parse::<LanguageIdentifier>() {
			Ok(lang) => vec![lang],
			Err(err) => {
				tracing::warn!(%tag, error = %err, "ignoring invalid locale");
				DesktopLanguageRequester::requested_languages()
			}
		},
		None => DesktopLanguageRequester::requested_languages(),
	};

	match i18n_embed::select(loader(), &Localizations, &requested) {
		Ok(selected) => tracing::debug!(?selected, "localization loaded"),
		Err(err) => tracing::warn!(error = %err, "localization fell back to built-in strings"),
	}
}

#[macro_export]
macro_rules! tr {
	($id:literal $(, $args:expr )* $(,)?) => {
		i18n_embed_fl::fl!($crate::i18n::loader(), $id $(, $args )* )
	};
}

#[cfg(test)]
mod tests {
	#[test]
	fn fallback_strings_resolve() {
		super::init(Some("en-US"));
		assert_eq!(crate::tr!("status-ready"), "Ready");
		assert!(crate::tr!("card-confidence", percent = 92).contains("92"));
		assert!(crate::tr!("status-latency", ms = 420u64).contains("420"));
	}
}
