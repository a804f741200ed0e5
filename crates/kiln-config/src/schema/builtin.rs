//! Schema for the user-facing Kiln configuration.

use once_cell::sync::Lazy;

use super::Schema;
use crate::value::FnKind;

static BUILDER_SCHEMA: Lazy<Schema> = Lazy::new(build);

/// The process-wide schema for Kiln configuration, built on first use.
pub fn builder_schema() -> &'static Schema {
    &BUILDER_SCHEMA
}

fn string_or_strings() -> Schema {
    Schema::union([Schema::string(), Schema::array(Schema::string())])
}

fn build() -> Schema {
    Schema::object([
        ("output", output().optional()),
        ("source", source().optional()),
        ("dev", dev().optional()),
        ("html", html().optional()),
        ("performance", performance().optional()),
        ("tools", tools().optional()),
        ("moduleFederation", module_federation().optional()),
    ])
}

fn output() -> Schema {
    Schema::object([
        (
            "distPath",
            Schema::object([
                ("root", Schema::string().optional()),
                ("js", Schema::string().optional()),
                ("css", Schema::string().optional()),
                ("html", Schema::string().optional()),
            ])
            .optional(),
        ),
        ("assetPrefix", Schema::string().optional()),
        ("filenameHash", Schema::boolean().optional()),
        (
            "polyfill",
            Schema::enumeration(["entry", "ua", "off"]).optional(),
        ),
        ("charset", Schema::enumeration(["ascii", "utf8"]).optional()),
        (
            "sourceMap",
            Schema::object([
                (
                    "js",
                    Schema::union([
                        Schema::literal(false),
                        Schema::enumeration([
                            "source-map",
                            "hidden-source-map",
                            "inline-source-map",
                            "cheap-source-map",
                            "cheap-module-source-map",
                            "eval",
                            "eval-source-map",
                        ]),
                    ])
                    .optional(),
                ),
                ("css", Schema::boolean().optional()),
            ])
            .optional(),
        ),
        (
            "overrideBrowserslist",
            Schema::array(Schema::string()).optional(),
        ),
        ("externals", Schema::record(Schema::any()).optional()),
        ("minify", Schema::boolean().optional()),
        ("cleanDistPath", Schema::boolean().optional()),
    ])
}

fn source() -> Schema {
    Schema::object([
        ("entry", Schema::record(string_or_strings()).optional()),
        ("preEntry", Schema::array(Schema::string()).optional()),
        ("include", Schema::array(Schema::string()).optional()),
        ("exclude", Schema::array(Schema::string()).optional()),
        ("define", Schema::record(Schema::any()).optional()),
        ("alias", Schema::record(string_or_strings()).optional()),
        ("compileJsDataURI", Schema::boolean().optional()),
    ])
}

fn dev() -> Schema {
    Schema::object([
        ("hmr", Schema::boolean().optional()),
        ("assetPrefix", Schema::string().optional()),
        ("progressBar", Schema::boolean().optional()),
        ("writeToDisk", Schema::boolean().optional()),
    ])
}

fn html() -> Schema {
    Schema::object([
        ("title", Schema::string().optional()),
        ("template", Schema::string().optional()),
        ("inject", Schema::enumeration(["head", "body"]).optional()),
        ("favicon", Schema::string().optional()),
        ("faviconByEntries", Schema::record(Schema::string()).optional()),
        ("mountId", Schema::string().optional()),
    ])
}

fn performance() -> Schema {
    Schema::object([
        (
            "chunkSplit",
            Schema::object([
                (
                    "strategy",
                    Schema::enumeration([
                        "split-by-experience",
                        "split-by-module",
                        "all-in-one",
                        "single-vendor",
                        "custom",
                    ])
                    .optional(),
                ),
                ("forceSplitting", Schema::record(Schema::string()).optional()),
                ("splitChunks", Schema::record(Schema::any()).optional()),
            ])
            .optional(),
        ),
        ("removeConsole", Schema::boolean().optional()),
        ("buildCache", Schema::boolean().optional()),
    ])
}

fn tools() -> Schema {
    let chain_fn = || Schema::function(FnKind::BundlerChain);
    let engine_tool = || {
        Schema::union([
            Schema::record(Schema::any()),
            Schema::function(FnKind::Engine),
        ])
    };

    Schema::object([
        (
            "bundlerChain",
            Schema::union([chain_fn(), Schema::array(chain_fn())]).optional(),
        ),
        (
            "rspack",
            Schema::union([engine_tool(), Schema::array(engine_tool())]).optional(),
        ),
        (
            "htmlPlugin",
            Schema::union([Schema::literal(false), Schema::record(Schema::any())]).optional(),
        ),
    ])
}

fn module_federation() -> Schema {
    Schema::object([(
        "options",
        Schema::object([
            ("name", Schema::string().optional()),
            ("filename", Schema::string().optional()),
            ("remotes", Schema::record(Schema::any()).optional()),
            ("exposes", Schema::record(Schema::any()).optional()),
            ("shared", Schema::any().optional()),
        ])
        .passthrough()
        .optional(),
    )])
}
