//! Single-pass flow resolution.
//!
//! Every tick the edge map is cleared and rebuilt by walking components in
//! one fixed category order: sources and control elements resolve before
//! passive conductors, and tanks resolve before the pump that drains them.
//! Each enabled component's supply is split evenly across its declared
//! outputs, one edge per output.
//!
//! This is a single forward pass, not a fixed-point iteration: a component
//! sees only flows written earlier in the traversal order. Cyclic
//! dependencies (two pumps mutually constraining each other within one
//! tick) are not resolved and are out of scope.
//!
//! ## The pump exception
//!
//! A pump's true constraint set needs the *upstream tank's* live volume
//! and the *downstream valve's* live position, neither of which is
//! reachable from a plain "divide my output across my outputs" rule. A
//! pump is therefore allowed a bounded traversal through intervening pipe
//! components (first tank upstream, first valve downstream) and writes an
//! extra edge directly from that tank to itself, bypassing the per-output
//! split. This is the one place flow is not simply "produce then fan out".
//! The traversal carries a visited set; a cyclic pipe run fails closed and
//! reads as "not found".

use std::collections::HashSet;

use hn_components::{Component, Pump, Tank, Valve};
use hn_graph::{Category, ComponentGraph, FlowMap, HasMeta, Meta};
use tracing::{debug, warn};

/// A tank can be drawn down at no more than half its current stock per
/// second (the availability heuristic).
const TANK_DRAW_FRACTION: f64 = 0.5;

/// Fixed category order the resolver walks each tick.
pub const EVALUATION_ORDER: [Category; 7] = [
    Category::Feed,
    Category::Valve,
    Category::Pipe,
    Category::Tank,
    Category::Pump,
    Category::Drain,
    Category::Sensor,
];

/// Clear and rebuild the flow-edge map for one tick.
pub fn resolve(graph: &ComponentGraph<Component>, flows: &mut FlowMap) {
    flows.clear();
    for category in EVALUATION_ORDER {
        for id in graph.ids_by_category(category) {
            let Some(component) = graph.get(&id) else {
                continue;
            };
            if !component.is_enabled() {
                continue;
            }
            match component {
                Component::Pump(pump) => resolve_pump(graph, pump, flows),
                other => fan_out(other.meta(), other.supply_m3s(), flows),
            }
        }
    }
}

/// Divide `supply` evenly across the declared outputs, one edge each.
fn fan_out(meta: &Meta, supply_m3s: f64, flows: &mut FlowMap) {
    if meta.outputs.is_empty() {
        return;
    }
    let share = supply_m3s / meta.outputs.len() as f64;
    for output in &meta.outputs {
        flows.set(&meta.id, output, share);
    }
}

fn resolve_pump(graph: &ComponentGraph<Component>, pump: &Pump, flows: &mut FlowMap) {
    let nominal = pump.nominal_flow_m3s();
    if nominal <= 0.0 {
        fan_out(&pump.meta, 0.0, flows);
        return;
    }

    let tank = find_upstream_tank(graph, &pump.meta);
    let valve_limit = find_downstream_valve(graph, &pump.meta)
        .map(|valve| valve.max_flow_m3s * valve.position)
        .unwrap_or(f64::INFINITY);

    let output = match tank {
        Some(tank) => {
            if tank.level() < pump.requires_min_level {
                warn!(
                    pump = %pump.meta.id,
                    tank = %tank.meta.id,
                    level = tank.level(),
                    min = pump.requires_min_level,
                    "pump starved: upstream tank below minimum level"
                );
                0.0
            } else {
                let available = tank.volume_m3 * TANK_DRAW_FRACTION;
                nominal.min(available).min(valve_limit)
            }
        }
        None => {
            // No reachable upstream tank. When the pump requires a minimum
            // level we cannot verify it, so the gate fails closed.
            if pump.requires_min_level > 0.0 {
                warn!(
                    pump = %pump.meta.id,
                    "pump requires a minimum tank level but no upstream tank was found"
                );
                0.0
            } else {
                nominal.min(valve_limit)
            }
        }
    };

    debug!(pump = %pump.meta.id, output, "resolved pump output");

    // Out-of-band edge from the tank straight to the pump, bypassing any
    // intervening pipes and the per-output split.
    if let Some(tank) = tank {
        flows.set(&tank.meta.id, &pump.meta.id, output);
    }
    fan_out(&pump.meta, output, flows);
}

/// First tank reachable upstream of `meta`, traversing only through pipes.
pub fn find_upstream_tank<'a>(
    graph: &'a ComponentGraph<Component>,
    meta: &Meta,
) -> Option<&'a Tank> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = meta.inputs.iter().map(String::as_str).collect();
    // Declared order wins: the stack is popped front-first.
    stack.reverse();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        match graph.get(id) {
            Some(Component::Tank(tank)) => return Some(tank),
            Some(Component::Pipe(pipe)) => {
                for input in pipe.meta.inputs.iter().rev() {
                    stack.push(input);
                }
            }
            // Any other category (or a sentinel/dangling id) ends the walk
            // along this branch.
            _ => {}
        }
    }
    None
}

/// First valve reachable downstream of `meta`, traversing only through
/// pipes.
pub fn find_downstream_valve<'a>(
    graph: &'a ComponentGraph<Component>,
    meta: &Meta,
) -> Option<&'a Valve> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = meta.outputs.iter().map(String::as_str).collect();
    stack.reverse();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        match graph.get(id) {
            Some(Component::Valve(valve)) => return Some(valve),
            Some(Component::Pipe(pipe)) => {
                for output in pipe.meta.outputs.iter().rev() {
                    stack.push(output);
                }
            }
            _ => {}
        }
    }
    None
}

/// Nearest upstream component exposing a temperature, walking through any
/// intervening components until one answers.
pub fn find_upstream_temperature(graph: &ComponentGraph<Component>, meta: &Meta) -> Option<f64> {
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(meta.id.as_str());
    let mut stack: Vec<&str> = meta.inputs.iter().map(String::as_str).collect();
    stack.reverse();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(component) = graph.get(id) else {
            continue;
        };
        if let Some(temp) = component.exposed_temperature_c() {
            return Some(temp);
        }
        for input in component.meta().inputs.iter().rev() {
            stack.push(input);
        }
    }
    None
}

/// The flow a passive conductor (pipe, sensor) observes: the resolved edge
/// between its declared input and output (exactly the edge a pump writes
/// when bypassing it), falling back to the aggregate inflow addressed to
/// the conductor itself.
pub fn observed_flow(meta: &Meta, flows: &FlowMap) -> f64 {
    if let (Some(input), Some(output)) = (meta.inputs.first(), meta.outputs.first()) {
        let through = flows.between(input, output);
        if through != 0.0 {
            return through;
        }
    }
    flows.aggregate_in(&meta.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_components::{Cavitation, Feed};

    fn graph_of(components: Vec<Component>) -> ComponentGraph<Component> {
        let mut graph = ComponentGraph::new();
        for component in components {
            graph.insert(component).unwrap();
        }
        graph
    }

    fn tank(id: &str, inputs: Vec<String>, outputs: Vec<String>, volume: f64) -> Component {
        Component::Tank(
            Tank::new(id, inputs, outputs, 1.2, 1.0)
                .unwrap()
                .with_initial_volume(volume),
        )
    }

    fn pipe(id: &str, inputs: Vec<String>, outputs: Vec<String>) -> Component {
        Component::Pipe(
            hn_components::Pipe::new(id, inputs, outputs, 0.05, 1.0, 0.0).unwrap(),
        )
    }

    #[test]
    fn feed_supply_fans_out_evenly() {
        let feed = Component::Feed(Feed::new(
            "feed1",
            vec!["tankA".into(), "tankB".into()],
            0.8,
        ));
        let graph = graph_of(vec![
            feed,
            tank("tankA", vec!["feed1".into()], vec![], 0.0),
            tank("tankB", vec!["feed1".into()], vec![], 0.0),
        ]);
        let mut flows = FlowMap::new();
        resolve(&graph, &mut flows);
        assert!((flows.between("feed1", "tankA") - 0.4).abs() < 1e-12);
        assert!((flows.between("feed1", "tankB") - 0.4).abs() < 1e-12);
    }

    #[test]
    fn disabled_component_writes_no_edges() {
        let mut feed = Feed::new("feed1", vec!["tank1".into()], 0.8);
        feed.meta.enabled = false;
        let graph = graph_of(vec![
            Component::Feed(feed),
            tank("tank1", vec!["feed1".into()], vec![], 0.0),
        ]);
        let mut flows = FlowMap::new();
        resolve(&graph, &mut flows);
        assert!(flows.is_empty());
    }

    #[test]
    fn pump_constrained_by_tank_availability() {
        // Tank at 0.6 m³ feeding a 0.5 m³/s pump at efficiency 0.95:
        // available 0.3 < nominal 0.475, so the pump moves 0.3.
        let mut pump = Pump::new(
            "pump1",
            vec!["tank1".into()],
            vec!["drain".into()],
            0.5,
            0.95,
        )
        .unwrap();
        pump.start();
        let graph = graph_of(vec![
            tank("tank1", vec![], vec!["pump1".into()], 0.6),
            Component::Pump(pump),
        ]);
        let mut flows = FlowMap::new();
        resolve(&graph, &mut flows);
        assert!((flows.between("tank1", "pump1") - 0.3).abs() < 1e-12);
        assert!((flows.between("pump1", "drain") - 0.3).abs() < 1e-12);
    }

    #[test]
    fn pump_gated_by_minimum_level() {
        let mut pump = Pump::new("pump1", vec!["tank1".into()], vec![], 0.5, 0.95)
            .unwrap()
            .with_min_level(0.6);
        pump.start();
        // Level 0.5 < required 0.6.
        let graph = graph_of(vec![
            tank("tank1", vec![], vec!["pump1".into()], 0.6),
            Component::Pump(pump),
        ]);
        let mut flows = FlowMap::new();
        resolve(&graph, &mut flows);
        assert_eq!(flows.between("tank1", "pump1"), 0.0);
    }

    #[test]
    fn pump_limited_by_downstream_valve_through_pipes() {
        let mut pump = Pump::new(
            "pump1",
            vec!["pipeA".into()],
            vec!["pipeB".into()],
            0.5,
            1.0,
        )
        .unwrap();
        pump.start();
        let valve = Component::Valve(
            Valve::new("valve1", vec!["pipeB".into()], vec![], 0.2, 1.0)
                .unwrap()
                .with_position(0.5),
        );
        let graph = graph_of(vec![
            tank("tank1", vec![], vec!["pipeA".into()], 1.2),
            pipe("pipeA", vec!["tank1".into()], vec!["pump1".into()]),
            Component::Pump(pump),
            pipe("pipeB", vec!["pump1".into()], vec!["valve1".into()]),
            valve,
        ]);
        let mut flows = FlowMap::new();
        resolve(&graph, &mut flows);
        // valve limit = 0.2 * 0.5 = 0.1, binding below nominal 0.5 and
        // availability 0.6. The bypass edge lands on (tank1, pump1).
        assert!((flows.between("tank1", "pump1") - 0.1).abs() < 1e-12);
        assert!((flows.between("pump1", "pipeB") - 0.1).abs() < 1e-12);
    }

    #[test]
    fn cyclic_pipe_run_fails_closed() {
        // pipeA and pipeB feed each other; the pump requires a minimum
        // level it can never verify, so it resolves to zero.
        let mut pump = Pump::new("pump1", vec!["pipeA".into()], vec![], 0.5, 1.0)
            .unwrap()
            .with_min_level(0.1);
        pump.start();
        let graph = graph_of(vec![
            pipe("pipeA", vec!["pipeB".into()], vec!["pump1".into()]),
            pipe("pipeB", vec!["pipeA".into()], vec!["pipeA".into()]),
            Component::Pump(pump),
        ]);
        let mut flows = FlowMap::new();
        resolve(&graph, &mut flows);
        assert_eq!(flows.aggregate_out("pump1"), 0.0);
    }

    #[test]
    fn stopped_pump_writes_zero_edges_only() {
        let pump = Pump::new("pump1", vec!["tank1".into()], vec!["out".into()], 0.5, 1.0)
            .unwrap()
            .with_cavitation(Cavitation::timed(60.0, 5.0, 0.3));
        let graph = graph_of(vec![
            tank("tank1", vec![], vec!["pump1".into()], 1.0),
            Component::Pump(pump),
        ]);
        let mut flows = FlowMap::new();
        resolve(&graph, &mut flows);
        assert_eq!(flows.between("pump1", "out"), 0.0);
        assert_eq!(flows.between("tank1", "pump1"), 0.0);
    }

    #[test]
    fn earlier_writer_visible_to_later_reader_only() {
        // Valve resolves before the tank category; the tank's inflow edge
        // exists by the time anything reads for the tank, but nothing
        // resolved before the valve can see it.
        let valve = Component::Valve(
            Valve::new("valve1", vec![], vec!["tank1".into()], 0.8, 1.0)
                .unwrap()
                .with_position(0.5),
        );
        let graph = graph_of(vec![
            valve,
            tank("tank1", vec!["valve1".into()], vec![], 0.0),
        ]);
        let mut flows = FlowMap::new();
        resolve(&graph, &mut flows);
        assert!((flows.aggregate_in("tank1") - 0.4).abs() < 1e-12);
    }

    #[test]
    fn observed_flow_prefers_through_edge() {
        let meta = Meta::new(
            "pipe1",
            Category::Pipe,
            vec!["tank1".into()],
            vec!["pump1".into()],
        );
        let mut flows = FlowMap::new();
        flows.set("tank1", "pump1", 0.3);
        flows.set("valve9", "pipe1", 0.9);
        assert_eq!(observed_flow(&meta, &flows), 0.3);

        let mut flows = FlowMap::new();
        flows.set("valve9", "pipe1", 0.9);
        assert_eq!(observed_flow(&meta, &flows), 0.9);
    }

    #[test]
    fn upstream_temperature_walks_past_non_exposing_components() {
        let feed = Component::Feed(
            Feed::new("feed1", vec!["valve1".into()], 1.0).with_temperature_c(75.0),
        );
        let valve = Component::Valve(
            Valve::new("valve1", vec!["feed1".into()], vec!["tank1".into()], 1.0, 1.0).unwrap(),
        );
        let t = tank("tank1", vec!["valve1".into()], vec![], 0.0);
        let graph = graph_of(vec![feed, valve, t]);
        let meta = graph.get("tank1").unwrap().meta().clone();
        assert_eq!(find_upstream_temperature(&graph, &meta), Some(75.0));
    }
}
