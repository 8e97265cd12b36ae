//! Runtime helpers the oxc transformer imports when lowering syntax.
//!
//! Lowered modules import helpers as
//! `import _defineProperty from "@oxc-project/runtime/helpers/defineProperty"`.
//! They are bundled from the sources embedded here instead of `node_modules`,
//! so a project needs no npm install to target an older ECMAScript version.

/// Package the transformer imports helpers from.
pub const RUNTIME_PACKAGE: &str = "@oxc-project/runtime";

macro_rules! helpers {
    ($($name:literal),* $(,)?) => {
        &[$(($name, include_str!(concat!("helpers/", $name, ".js")))),*]
    };
}

/// Helper name and ES module source.
const HELPERS: &[(&str, &str)] = helpers![
    "assertClassBrand",
    "asyncGeneratorDelegate",
    "asyncIterator",
    "asyncToGenerator",
    "awaitAsyncGenerator",
    "checkInRHS",
    "checkPrivateRedeclaration",
    "classPrivateFieldGet2",
    "classPrivateFieldInitSpec",
    "classPrivateFieldLooseBase",
    "classPrivateFieldLooseKey",
    "classPrivateFieldSet2",
    "classPrivateMethodInitSpec",
    "defineProperty",
    "extends",
    "objectDestructuringEmpty",
    "objectSpread2",
    "objectWithoutProperties",
    "objectWithoutPropertiesLoose",
    "OverloadYield",
    "readOnlyError",
    "superPropGet",
    "superPropSet",
    "taggedTemplateLiteral",
    "toPrimitive",
    "toPropertyKey",
    "toSetter",
    "wrapAsyncGenerator",
    "writeOnlyError",
];

/// Look up the helper a specifier such as
/// `@oxc-project/runtime/helpers/objectSpread2` names. Returns the helper's
/// name, which doubles as its key for [`source`].
pub fn find(specifier: &str) -> Option<&'static str> {
    let name = specifier
        .strip_prefix(RUNTIME_PACKAGE)?
        .strip_prefix("/helpers/")?;
    let name = name.strip_prefix("esm/").unwrap_or(name);
    let name = name.strip_suffix(".js").unwrap_or(name);

    HELPERS
        .iter()
        .find(|(helper, _)| *helper == name)
        .map(|(helper, _)| *helper)
}

/// Source text of the helper called `name`.
pub fn source(name: &str) -> Option<&'static str> {
    HELPERS
        .iter()
        .find(|(helper, _)| *helper == name)
        .map(|(_, source)| *source)
}
