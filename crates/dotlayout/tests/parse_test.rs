use dotlayout::{AttrKind, Error, parse};

#[test]
fn reads_nodes_edges_and_attributes() {
    let g = parse(
        r#"
        // comment
        strict digraph "G" {
            rankdir = LR;
            node [shape=box, fontsize=10];
            a [label="Alpha"];
            a -> b -> c [color=red];
            # preprocessor-style line
            /* block */
            c -> a;
        }
        "#,
    )
    .unwrap();

    assert_eq!(g.name(), "G");
    assert!(g.is_directed());
    assert!(g.is_strict());
    assert_eq!(g.graph_attr("rankdir"), Some("LR"));
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 3);

    let a = g.find_node("a").unwrap();
    let b = g.find_node("b").unwrap();
    assert_eq!(g.node_attr(a, "label"), Some("Alpha"));
    assert_eq!(g.node_attr(b, "shape"), Some("box"));
    assert_eq!(g.node_attr(b, "fontsize"), Some("10"));

    let ab = g.find_edge(a, b, None).unwrap();
    assert_eq!(g.edge_attr(ab, "color"), Some("red"));
    assert!(g.defaults().is_declared(AttrKind::Edge, "color"));
}

#[test]
fn node_defaults_only_apply_to_later_nodes() {
    let g = parse("digraph { a; node [shape=box]; b; }").unwrap();
    let a = g.find_node("a").unwrap();
    let b = g.find_node("b").unwrap();
    // Declared but unset: falls back to the empty default.
    assert_eq!(g.node_attr(a, "shape"), Some(""));
    assert_eq!(g.node_attr(b, "shape"), Some("box"));
}

#[test]
fn subgraph_operands_expand_to_every_member() {
    let g = parse("digraph { a -> { b c } }").unwrap();
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 2);
    let a = g.find_node("a").unwrap();
    assert_eq!(g.out_edges(a).len(), 2);
}

#[test]
fn undirected_graphs_and_concatenated_strings() {
    let g = parse(r#"graph { x [label="foo" + "bar"]; x -- y }"#).unwrap();
    assert!(!g.is_directed());
    let x = g.find_node("x").unwrap();
    assert_eq!(g.node_attr(x, "label"), Some("foobar"));
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn quoted_ids_keep_escapes_other_than_quotes() {
    let g = parse(r#"digraph { a [label="say \"hi\"\n"] }"#).unwrap();
    let a = g.find_node("a").unwrap();
    assert_eq!(g.node_attr(a, "label"), Some(r#"say "hi"\n"#));
}

#[test]
fn syntax_errors_carry_a_position() {
    let err = parse("digraph {\n  a -> ;\n}").unwrap_err();
    assert!(matches!(err, Error::Parse { line: 2, .. }));
    assert!(err.to_string().starts_with("DOT parse error at 2:"));

    assert!(matches!(parse("").unwrap_err(), Error::Parse { .. }));
    assert!(matches!(
        parse("digraph { /* open").unwrap_err(),
        Error::Parse { .. }
    ));
}
