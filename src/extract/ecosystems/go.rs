//! Routing idioms for Go: Gin/Echo routers, Gorilla mux, net/http tables.

use crate::extract::rules::{Ecosystem, MethodSpec, PathSpec, RouteRule};

pub fn rules() -> Vec<RouteRule> {
    vec![
        // Gin/Echo uppercase verb methods on a router value.
        RouteRule {
            framework: "Gin",
            ecosystem: Ecosystem::Go,
            pattern: r#"\w+\.(GET|POST|PUT|DELETE|PATCH)\s*\(\s*"([^"]+)""#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
        // Gorilla mux with an explicit methods restriction.
        RouteRule {
            framework: "Gorilla",
            ecosystem: Ecosystem::Go,
            pattern: r#"\.HandleFunc\s*\(\s*"([^"]+)"[^)]*\)\s*\.\s*Methods\s*\(\s*"(\w+)""#,
            method: MethodSpec::Capture(2),
            path: PathSpec::Capture(1),
        },
        // Plain net/http handler tables default to GET.
        RouteRule {
            framework: "net/http",
            ecosystem: Ecosystem::Go,
            pattern: r#"http\.HandleFunc\s*\(\s*"([^"]+)""#,
            method: MethodSpec::Fixed("GET"),
            path: PathSpec::Capture(1),
        },
    ]
}
