use dotlayout::{Context, Error, Graph, ShapeInfo, parse};

fn laid_out(src: &str) -> Graph {
    let mut g = parse(src).unwrap();
    Context::new().layout(&mut g, "dot").unwrap();
    g
}

fn center(g: &Graph, name: &str) -> dotlayout::Point {
    let n = g.find_node(name).unwrap();
    g.node_layout(n).unwrap().coord
}

fn assert_inside_bb(g: &Graph) {
    let bb = g.bounding_box();
    assert_eq!(bb.min.x, 0.0);
    assert_eq!(bb.min.y, 0.0);
    for n in g.nodes() {
        let l = g.node_layout(n).unwrap();
        assert!(l.coord.x - l.size.width / 2.0 >= -1e-6);
        assert!(l.coord.y - l.size.height / 2.0 >= -1e-6);
        assert!(l.coord.x + l.size.width / 2.0 <= bb.max.x + 1e-6);
        assert!(l.coord.y + l.size.height / 2.0 <= bb.max.y + 1e-6);
    }
}

const TREE: &str = "digraph { root -> child; child -> l1; child -> l2; child -> l3 }";

#[test]
fn tree_is_ranked_top_to_bottom() {
    let g = laid_out(TREE);
    assert!(g.is_laid_out());
    assert_inside_bb(&g);

    let root = center(&g, "root");
    let child = center(&g, "child");
    let leaves = ["l1", "l2", "l3"].map(|n| center(&g, n));
    assert!(root.y > child.y);
    assert!(leaves.iter().all(|l| l.y < child.y));
    assert!(leaves.iter().all(|l| l.y == leaves[0].y));
    assert!(leaves[0].x != leaves[1].x && leaves[1].x != leaves[2].x);

    for e in g.edges() {
        let layout = g.edge_layout(e).unwrap();
        assert_eq!(layout.splines.len(), 1);
        let b = &layout.splines[0];
        assert!(b.is_well_formed());
        assert!(b.start.is_none());
        assert!(b.end.is_some());
    }
}

#[test]
fn rankdir_lr_ranks_left_to_right() {
    let g = laid_out("digraph { rankdir=LR; a -> b -> c }");
    let (a, b, c) = (center(&g, "a"), center(&g, "b"), center(&g, "c"));
    assert!(a.x < b.x && b.x < c.x);
    assert_eq!(a.y, b.y);
    assert_inside_bb(&g);
}

#[test]
fn cycles_and_self_loops_are_routed() {
    let g = laid_out("digraph { a -> b; b -> c; c -> a; c -> c }");
    assert_inside_bb(&g);
    for e in g.edges() {
        let b = &g.edge_layout(e).unwrap().splines[0];
        assert!(b.is_well_formed());
        assert!(b.points.len() >= 4);
    }
    let c = g.find_node("c").unwrap();
    let self_loop = g
        .out_edges(c)
        .iter()
        .copied()
        .find(|&e| g.head(e) == c)
        .unwrap();
    let b = &g.edge_layout(self_loop).unwrap().splines[0];
    assert_eq!(b.points.len(), 7);
    // The loop hangs off the right side of its node.
    let cx = center(&g, "c").x;
    assert!(b.points.iter().all(|p| p.x >= cx));
}

#[test]
fn undirected_edges_have_no_arrows() {
    let g = laid_out("graph { a -- b }");
    let e = g.edges().next().unwrap();
    let b = &g.edge_layout(e).unwrap().splines[0];
    assert!(b.start.is_none() && b.end.is_none());
}

#[test]
fn dir_both_puts_arrows_on_both_ends() {
    let g = laid_out("digraph { a -> b [dir=both] }");
    let e = g.edges().next().unwrap();
    let b = &g.edge_layout(e).unwrap().splines[0];
    assert!(b.start.is_some() && b.end.is_some());
}

#[test]
fn edge_labels_are_placed() {
    let g = laid_out(r#"digraph { a -> b [label="\T to \H"] }"#);
    let e = g.edges().next().unwrap();
    let label = g.edge_layout(e).unwrap().label.as_ref().unwrap();
    assert_eq!(label.text, "a to b");
    let pos = label.pos.unwrap();
    let (a, b) = (center(&g, "a"), center(&g, "b"));
    assert!(pos.y < a.y && pos.y > b.y);
    assert!(pos.x > a.x);
}

#[test]
fn parallel_edges_do_not_overlap() {
    let g = laid_out("digraph { a -> b; a -> b }");
    let splines: Vec<_> = g
        .edges()
        .map(|e| g.edge_layout(e).unwrap().splines[0].clone())
        .collect();
    assert_ne!(splines[0].points[1], splines[1].points[1]);
}

#[test]
fn node_shapes_produce_vertex_rings() {
    let g = laid_out(
        "digraph { d [shape=doubleoctagon]; e [shape=ellipse]; b [shape=box, peripheries=0] }",
    );

    let d = g.node_layout(g.find_node("d").unwrap()).unwrap();
    let ShapeInfo::Polygon(p) = &d.shape_info else {
        panic!("expected a polygon");
    };
    assert_eq!(p.sides, 8);
    assert_eq!(p.peripheries, 2);
    assert_eq!(p.vertices.len(), 16);
    assert_eq!(p.rings().count(), 2);

    let e = g.node_layout(g.find_node("e").unwrap()).unwrap();
    let ShapeInfo::Polygon(p) = &e.shape_info else {
        panic!("expected a polygon");
    };
    assert_eq!(p.sides, 2);
    assert_eq!(p.vertices.len(), 2);

    let b = g.node_layout(g.find_node("b").unwrap()).unwrap();
    let ShapeInfo::Polygon(p) = &b.shape_info else {
        panic!("expected a polygon");
    };
    assert_eq!(p.peripheries, 0);
    assert_eq!(p.rings().take(p.peripheries).count(), 0);
}

#[test]
fn records_get_field_boxes() {
    let g = laid_out(r#"digraph { r [shape=record, label="<f0> left|mid|right"] }"#);
    let r = g.node_layout(g.find_node("r").unwrap()).unwrap();
    let label = r.label.as_ref().unwrap();
    assert_eq!(label.text, "left|mid|right");
    assert!(label.pos.is_none());
    assert!(label.space.width <= r.size.width);
    let ShapeInfo::Record(fields) = &r.shape_info else {
        panic!("expected record fields");
    };
    let texts: Vec<&str> = fields.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, ["left", "mid", "right"]);
    assert!(fields[0].bb.max.x <= fields[1].bb.min.x + 1e-6);
}

#[test]
fn node_labels_default_to_the_node_name() {
    let g = laid_out("digraph { hello; point [shape=point] }");
    let hello = g.node_layout(g.find_node("hello").unwrap()).unwrap();
    let label = hello.label.as_ref().unwrap();
    assert_eq!(label.text, "hello");
    assert_eq!(label.fontname, "Times-Roman");
    assert_eq!(label.fontsize, 14.0);
    assert_eq!(label.valign, 'c');
    assert!(label.pos.is_none());

    let point = g.node_layout(g.find_node("point").unwrap()).unwrap();
    assert!(point.label.is_none());
    assert!(point.size.width < hello.size.width);
}

#[test]
fn relayout_replaces_previous_results() {
    let mut g = laid_out("digraph { a -> b }");
    let before = g.bounding_box();
    let c = g.add_node("c");
    let b = g.find_node("b").unwrap();
    g.add_edge(b, c, None);
    assert!(g.node_layout(c).is_none());

    Context::new().layout(&mut g, "dot").unwrap();
    assert!(g.node_layout(c).is_some());
    assert!(g.bounding_box().height() > before.height());
}

#[test]
fn empty_graphs_have_an_empty_box() {
    let g = laid_out("digraph {}");
    assert!(g.is_laid_out());
    assert_eq!(g.bounding_box().width(), 0.0);
}

#[test]
fn unknown_engines_are_rejected() {
    let mut g = parse("digraph { a }").unwrap();
    let err = Context::new().layout(&mut g, "neato").unwrap_err();
    assert!(matches!(err, Error::UnknownLayoutEngine { ref name } if name == "neato"));
    assert!(!g.is_laid_out());
}

#[test]
fn layout_results_serialize() {
    let g = laid_out("digraph { a -> b }");
    let a = g.node_layout(g.find_node("a").unwrap()).unwrap();
    let json = serde_json::to_value(a).unwrap();
    assert!(json.get("coord").is_some());
    assert!(json.get("shape_info").is_some());
}
