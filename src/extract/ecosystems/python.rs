//! Routing idioms for the Python ecosystem: FastAPI and Flask decorators,
//! Django URL tables, DRF function views.

use crate::extract::rules::{Ecosystem, MethodSpec, PathSpec, RouteRule};

pub fn rules() -> Vec<RouteRule> {
    vec![
        // FastAPI decorators on an app or router object.
        RouteRule {
            framework: "FastAPI",
            ecosystem: Ecosystem::Python,
            pattern: r#"@(?:app|router)\.(get|post|put|delete|patch|head|options)\s*\(\s*["']([^"']+)["']"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
        // Flask route with an explicit methods list; only the first verb is
        // taken, matching how one declaration maps to one primary endpoint.
        RouteRule {
            framework: "Flask",
            ecosystem: Ecosystem::Python,
            pattern: r#"@(?:app|bp|blueprint)\.route\s*\(\s*["']([^"']+)["'][^)]*methods\s*=\s*\[\s*["'](\w+)["']"#,
            method: MethodSpec::Capture(2),
            path: PathSpec::Capture(1),
        },
        // Flask route without methods defaults to GET.
        RouteRule {
            framework: "Flask",
            ecosystem: Ecosystem::Python,
            pattern: r#"@(?:app|bp|blueprint)\.route\s*\(\s*["']([^"']+)["']\s*\)"#,
            method: MethodSpec::Fixed("GET"),
            path: PathSpec::Capture(1),
        },
        // Django declarative URL tables.
        RouteRule {
            framework: "Django",
            ecosystem: Ecosystem::Python,
            pattern: r#"(?:re_)?path\s*\(\s*["']([^"']+)["']\s*,"#,
            method: MethodSpec::Fixed("GET"),
            path: PathSpec::Capture(1),
        },
        RouteRule {
            framework: "Django",
            ecosystem: Ecosystem::Python,
            pattern: r#"url\s*\(\s*r?["']\^?([^"'$]+)\$?["']\s*,"#,
            method: MethodSpec::Fixed("GET"),
            path: PathSpec::Capture(1),
        },
        // DRF function views: verb from the decorator, path from the
        // handler's name (convention routing).
        RouteRule {
            framework: "Django REST",
            ecosystem: Ecosystem::Python,
            pattern: r#"@api_view\s*\(\s*\[\s*["'](\w+)["'][^\]]*\]\s*\)\s*\r?\n\s*def\s+(\w+)"#,
            method: MethodSpec::Capture(1),
            path: PathSpec::HandlerName(2),
        },
    ]
}
