//! Routing idioms for the JVM: Spring mapping annotations and JAX-RS.

use crate::extract::rules::{Ecosystem, MethodSpec, PathSpec, RouteRule};

pub fn rules() -> Vec<RouteRule> {
    vec![
        // Spring verb-specific mapping annotations with a path.
        RouteRule {
            framework: "Spring",
            ecosystem: Ecosystem::Java,
            pattern: r#"@((?:Get|Post|Put|Delete|Patch)Mapping)\s*\(\s*(?:value\s*=\s*)?"([^"]+)""#,
            method: MethodSpec::Annotation(1),
            path: PathSpec::Capture(2),
        },
        // Bare mapping annotation routes by the method name below it.
        RouteRule {
            framework: "Spring",
            ecosystem: Ecosystem::Java,
            pattern: r#"@((?:Get|Post|Put|Delete|Patch)Mapping)\s*(?:\(\s*\))?\s*\r?\n\s*(?:public|protected|private)\s+[^\r\n(]*?(\w+)\s*\("#,
            method: MethodSpec::Annotation(1),
            path: PathSpec::HandlerName(2),
        },
        // RequestMapping with an explicit RequestMethod.
        RouteRule {
            framework: "Spring",
            ecosystem: Ecosystem::Java,
            pattern: r#"@RequestMapping\s*\(\s*(?:value\s*=\s*)?"([^"]+)"[^)]*method\s*=\s*RequestMethod\.(\w+)"#,
            method: MethodSpec::Capture(2),
            path: PathSpec::Capture(1),
        },
        // RequestMapping without a method defaults to GET.
        RouteRule {
            framework: "Spring",
            ecosystem: Ecosystem::Java,
            pattern: r#"@RequestMapping\s*\(\s*"([^"]+)"\s*\)"#,
            method: MethodSpec::Fixed("GET"),
            path: PathSpec::Capture(1),
        },
        // JAX-RS verb annotation paired with @Path nearby.
        RouteRule {
            framework: "JAX-RS",
            ecosystem: Ecosystem::Java,
            pattern: r#"(?s)@(GET|POST|PUT|DELETE)\b.{0,120}?@Path\s*\(\s*"([^"]+)""#,
            method: MethodSpec::Capture(1),
            path: PathSpec::Capture(2),
        },
    ]
}
