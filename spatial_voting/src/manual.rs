/*!

This is the long-form manual for `spatial_voting` and `polarsim`.

## Voter distributions

The electorate lives on an interval of the spectrum: `[0, 1]` for the
continuous distributions and `[0, 20]` for the discrete ones, unless
`spectrumStart` and `spectrumEnd` say otherwise.

* `normal` (default) A normal density. `location` defaults to 0.5 and `scale` to 0.2.
* `randomNormal` A normal density whose location is drawn in the lower 40% of the
  spectrum every time the distribution is recreated. `scale` defaults to the
  width of the spectrum.
* `uniform` A flat density.
* `randomSpline` A smooth curve through `controlPoints` (default 10) random heights.
* `discrete` A fixed list of `voters`.
* `discreteUniform` `numVoters` voters drawn uniformly over the spectrum.

Continuous distributions are sampled over `gridSections` cells (default 50000).
Vote shares are fractions of the electorate in every model, and two shares
covering the same number of equally weighted cells or voters compare equal.
Candidate positions are moved to the nearest cell boundary, and every voter
between two boundaries counts as sitting in the middle of its cell.

## Candidates

The `candidates` section takes one of:
* `count` (default 4): candidates are drawn from the voter distribution itself,
  so that they are denser where voters are denser. A draw on the median is rejected.
* `leftCount` and `rightCount`: exactly this many candidates on each side of
  the median, uniformly within that side.
* `positions`: fixed positions, only for the `once` and `histogram` scenarios.

Asking for more candidates than the distribution has distinct positions is an error.

## Scenarios

* `once` A single election. The summary shows both primaries, the general
  election and every instant-runoff round.
* `trials` (default) Monte Carlo trials. The summary counts how often ranked choice
  voting was more polarized (`above`), as polarized (`equal`) or less polarized
  (`below`) than the primary system, and gives the (CES, RCV) points of the
  first `scatterLimit` trials (default 1000). With a `filter` section
  (`leftCandidates`, `cesWinner`, `rcvWinner`), the summary also lists the
  trials where both winners sit at the given indices of the sorted candidates.
* `candidateSweep` Trials for every candidate count from `minCandidates` (default 3)
  to `maxCandidates` (default 5).
* `distributionGrid` Trials over a grid of normal distributions, given by the
  `means` and `deviations` lists of the `grid` section. The default grid has
  means 0.5 to 0.9 and deviations 0.05 to 0.8.
* `histogram` The mass of voters behind every sincere ranking of the candidates.

## Trials

The `trials` section accepts `trials` (default 500) and `scatterLimit`. Random
distributions are drawn once for the whole run unless recreation is on. Giving
`trialsPerRecreation` turns it on and draws a new distribution every that many
trials. `recreateDistribution: true` alone also turns it on, every 100 trials.
`recreateDistribution: false` turns it off even when `trialsPerRecreation` is
given.

## Example

```text
{
  "scenario": "trials",
  "seed": 42,
  "distribution": {"kind": "randomSpline", "gridSections": 2000},
  "candidates": {"leftCount": 2, "rightCount": 2},
  "trials": {"trials": 1000, "trialsPerRecreation": 50}
}
```

`polarsim --config scenario.json --out summary.json` runs it. The `--scenario`,
`--distribution`, `--trials`, `--candidates` and `--seed` flags override the
file, and `--reference` checks the summary against a previous one.

## Ties

An election where the two final candidates share the vote exactly is a tie.
Its polarization uses the midpoint of the tied candidates. Other ties (in a
primary or for the last place of a round) go to the leftmost candidate.

 */
