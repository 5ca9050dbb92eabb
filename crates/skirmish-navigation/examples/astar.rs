use skirmish_navigation::{GridCoord, GridIndex, PathFinder};
use std::collections::HashSet;

fn main() {
    // Create a grid
    // . = walkable
    // X = blocked
    let layout = [
        "..........", // Row 0
        ".XX....XX.", // Row 1
        "....X.....", // Row 2
        "..XXXX.X..", // Row 3
        ".....X.X..", // Row 4
        ".XXX.X.XX.", // Row 5
        "...X......", // Row 6
        ".X.X.XXX..", // Row 7
        ".X......X.", // Row 8
        "...XXX....", // Row 9
    ];

    let mut grid = GridIndex::new(10, 10).expect("valid dimensions");
    for (z, row) in layout.iter().enumerate() {
        for (x, cell) in row.chars().enumerate() {
            if cell == 'X' {
                grid.place(GridCoord::new(x as i32, z as i32), 'X')
                    .expect("cell inside the grid");
            }
        }
    }

    let start = GridCoord::new(0, 0);
    let goal = GridCoord::new(9, 9);

    println!("Grid:");
    print_grid(&layout, start, goal, &HashSet::new());
    println!("\nStart: {}, Goal: {}", start, goal);

    let result = PathFinder::default()
        .search_detailed(start, goal, &grid)
        .expect("start and goal are in bounds");
    println!("\n{}", result);

    match result.into_path() {
        Some(path) => {
            println!("\nPath found: {:?}", path);
            let path_set: HashSet<GridCoord> = path.iter().copied().collect();
            println!("\nGrid with path:");
            print_grid(&layout, start, goal, &path_set);
        }
        None => println!("\nNo path found."),
    }
}

fn print_grid(layout: &[&str], start: GridCoord, goal: GridCoord, path: &HashSet<GridCoord>) {
    for (z, row) in layout.iter().enumerate() {
        for (x, cell) in row.chars().enumerate() {
            let current = GridCoord::new(x as i32, z as i32);
            if current == start {
                print!("S ");
            } else if current == goal {
                print!("G ");
            } else if path.contains(&current) {
                print!("* ");
            } else if cell == 'X' {
                print!("X ");
            } else {
                print!(". ");
            }
        }
        println!();
    }
}
